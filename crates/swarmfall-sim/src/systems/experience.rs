//! Experience and upgrade system.
//!
//! Converts banked experience into levels, holds the pending level-up
//! count, and offers and applies upgrades.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use swarmfall_core::balance::{BalanceTable, PlayerTuning};
use swarmfall_core::components::*;
use swarmfall_core::constants::{LEVEL_SCORE_BONUS, LEVEL_UP_HEAL_FRACTION, UPGRADE_CHOICES};
use swarmfall_core::enums::*;
use swarmfall_core::events::GameEvent;

use crate::world::World;

/// Experience needed to leave `level`: `floor(base * multiplier^(level-1))`.
pub fn experience_for_level(level: u32, tuning: &PlayerTuning) -> u32 {
    let exponent = level.saturating_sub(1) as i32;
    let needed = tuning.base_experience as f64 * (tuning.experience_multiplier as f64).powi(exponent);
    if needed >= u32::MAX as f64 {
        u32::MAX
    } else {
        (needed.floor() as u32).max(1)
    }
}

/// Pending level-ups and the offers currently on the table.
#[derive(Debug, Clone, Default)]
pub struct ExperienceSystem {
    pending: u32,
    choices: Vec<Upgrade>,
}

impl ExperienceSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn choices(&self) -> &[Upgrade] {
        &self.choices
    }

    pub fn reset(&mut self) {
        self.pending = 0;
        self.choices.clear();
    }

    /// Spend banked experience on as many levels as it covers.
    /// Returns the number of levels gained.
    pub fn update(&mut self, world: &mut World, balance: &BalanceTable, rng: &mut ChaCha8Rng) -> u32 {
        let player = &mut world.player;
        let mut gained = 0;
        while player.experience >= player.experience_to_next {
            player.experience -= player.experience_to_next;
            player.level += 1;
            player.experience_to_next = experience_for_level(player.level, &balance.player);

            let heal = player.body.max_health * LEVEL_UP_HEAL_FRACTION;
            player.body.health = (player.body.health + heal).min(player.body.max_health);
            world.score += player.level as u64 * LEVEL_SCORE_BONUS;
            world.events.push(GameEvent::LevelUp { level: player.level });
            info!("Level up: {} (next at {} xp)", player.level, player.experience_to_next);
            gained += 1;
            self.pending += 1;
            self.generate_choices(player, balance, rng);
        }
        gained
    }

    /// Draw up to three offers from the eligible pool: stat lines below
    /// their cap and weapons the player does not own yet.
    pub fn generate_choices(&mut self, player: &Player, balance: &BalanceTable, rng: &mut ChaCha8Rng) {
        let mut offers: Vec<Upgrade> = StatUpgrade::ALL
            .into_iter()
            .filter_map(|stat| {
                let current = player.upgrade_level(UpgradeKind::Stat(stat));
                let max_level = balance.upgrade(stat).max_level;
                (current < max_level).then(|| stat_offer(stat, current + 1, max_level, balance))
            })
            .collect();
        offers.extend(
            WeaponKind::ALL
                .into_iter()
                .filter(|&kind| !player.owns_weapon(kind))
                .map(unlock_offer),
        );

        offers.shuffle(rng);
        offers.truncate(UPGRADE_CHOICES);
        self.choices = offers;
    }

    /// Apply the offer with `id`. Unknown ids are ignored.
    ///
    /// Consumes one pending level-up; further offers are drawn while any
    /// remain.
    pub fn apply_upgrade(
        &mut self,
        world: &mut World,
        balance: &BalanceTable,
        rng: &mut ChaCha8Rng,
        id: &str,
    ) -> bool {
        let Some(upgrade) = self.choices.iter().find(|u| u.id == id).cloned() else {
            debug!("Ignoring unknown upgrade choice {id:?}");
            return false;
        };

        apply_effect(&mut world.player, &upgrade.effect, balance, &mut world.events);
        record(&mut world.player, upgrade.kind, upgrade.level);
        debug!("Applied upgrade {} (level {})", upgrade.id, upgrade.level);

        self.pending = self.pending.saturating_sub(1);
        if self.pending > 0 {
            self.generate_choices(&world.player, balance, rng);
        } else {
            self.choices.clear();
        }
        true
    }

    /// Stage offers directly, bypassing the random draw.
    #[cfg(test)]
    pub fn force_choices(&mut self, choices: Vec<Upgrade>, pending: u32) {
        self.choices = choices;
        self.pending = pending;
    }
}

/// Apply an upgrade's effect to the player's current stats.
pub fn apply_effect(
    player: &mut Player,
    effect: &UpgradeEffect,
    balance: &BalanceTable,
    events: &mut Vec<GameEvent>,
) {
    match *effect {
        UpgradeEffect::Weapons { stat, change, target } => {
            for weapon in player.weapons.iter_mut().filter(|w| target.matches(w.kind)) {
                apply_weapon_stat(weapon, stat, change);
                if let WeaponTarget::Kind(_) = target {
                    weapon.level += 1;
                }
            }
        }
        UpgradeEffect::Player { stat, change } => apply_player_stat(player, stat, change),
        UpgradeEffect::UnlockWeapon { kind } => {
            if !player.owns_weapon(kind) {
                player.weapons.push(Weapon::from_stats(kind, balance.weapon(kind)));
                events.push(GameEvent::WeaponUnlocked { kind });
                debug!("Weapon unlocked: {}", kind.as_str());
            }
        }
    }
}

fn apply_weapon_stat(weapon: &mut Weapon, stat: WeaponStat, change: StatChange) {
    match stat {
        WeaponStat::Damage => weapon.damage = change.apply(weapon.damage),
        WeaponStat::FireRate => weapon.fire_rate = change.apply(weapon.fire_rate),
        WeaponStat::ProjectileSpeed => {
            weapon.projectile_speed = change.apply(weapon.projectile_speed)
        }
        WeaponStat::ProjectileCount => {
            weapon.projectile_count = change.apply_count(weapon.projectile_count).max(1)
        }
        WeaponStat::Pierce => weapon.pierce = change.apply_count(weapon.pierce),
        WeaponStat::Area => weapon.area = change.apply(weapon.area),
    }
}

fn apply_player_stat(player: &mut Player, stat: PlayerStat, change: StatChange) {
    match stat {
        PlayerStat::MoveSpeed => {
            player.move_speed = change.apply(player.move_speed);
            player.body.speed = player.move_speed;
        }
        PlayerStat::MaxHealth => {
            let max = change.apply(player.body.max_health);
            let gained = (max - player.body.max_health).max(0.0);
            player.body.max_health = max;
            player.body.health = (player.body.health + gained).min(max);
        }
        PlayerStat::PickupRadius => player.pickup_radius = change.apply(player.pickup_radius),
    }
}

fn record(player: &mut Player, kind: UpgradeKind, level: u32) {
    match player.upgrades.iter_mut().find(|r| r.kind == kind) {
        Some(entry) => entry.level = level,
        None => player.upgrades.push(UpgradeRecord { kind, level }),
    }
}

fn stat_offer(stat: StatUpgrade, level: u32, max_level: u32, balance: &BalanceTable) -> Upgrade {
    let kind = UpgradeKind::Stat(stat);
    let effect = balance.upgrade_effect(stat);
    Upgrade {
        id: kind.id(),
        kind,
        name: stat_name(stat).to_string(),
        description: describe(stat, &effect),
        level,
        max_level,
        effect,
    }
}

fn unlock_offer(kind: WeaponKind) -> Upgrade {
    let upgrade_kind = UpgradeKind::UnlockWeapon(kind);
    let name = weapon_name(kind);
    Upgrade {
        id: upgrade_kind.id(),
        kind: upgrade_kind,
        name: name.to_string(),
        description: format!("Unlock the {name}"),
        level: 1,
        max_level: 1,
        effect: UpgradeEffect::UnlockWeapon { kind },
    }
}

fn stat_name(stat: StatUpgrade) -> &'static str {
    match stat {
        StatUpgrade::Damage => "Damage",
        StatUpgrade::FireRate => "Fire Rate",
        StatUpgrade::ProjectileSpeed => "Projectile Speed",
        StatUpgrade::ProjectileCount => "Multishot",
        StatUpgrade::Pierce => "Pierce",
        StatUpgrade::Area => "Area",
        StatUpgrade::MoveSpeed => "Move Speed",
        StatUpgrade::MaxHealth => "Max Health",
        StatUpgrade::PickupRadius => "Magnet",
    }
}

fn weapon_name(kind: WeaponKind) -> &'static str {
    match kind {
        WeaponKind::Bullet => "Bullet",
        WeaponKind::Fireball => "Fireball",
        WeaponKind::Lightning => "Lightning",
        WeaponKind::Blade => "Orbiting Blade",
        WeaponKind::Aura => "Damage Aura",
    }
}

fn describe(stat: StatUpgrade, effect: &UpgradeEffect) -> String {
    let subject = match stat {
        StatUpgrade::Damage => "weapon damage",
        StatUpgrade::FireRate => "fire rate",
        StatUpgrade::ProjectileSpeed => "projectile speed",
        StatUpgrade::ProjectileCount => "projectiles per shot",
        StatUpgrade::Pierce => "pierce",
        StatUpgrade::Area => "weapon area",
        StatUpgrade::MoveSpeed => "move speed",
        StatUpgrade::MaxHealth => "max health",
        StatUpgrade::PickupRadius => "pickup radius",
    };
    let change = match effect {
        UpgradeEffect::Weapons { change, .. } | UpgradeEffect::Player { change, .. } => *change,
        UpgradeEffect::UnlockWeapon { .. } => return subject.to_string(),
    };
    match change {
        StatChange::Percent(pct) => format!("+{:.0}% {subject}", pct * 100.0),
        StatChange::Flat(amount) => format!("+{amount} {subject}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    use crate::engine::EngineConfig;

    fn setup() -> (World, BalanceTable, ChaCha8Rng, ExperienceSystem) {
        let config = EngineConfig::default();
        let balance = config.balance;
        (World::new(&config), balance, ChaCha8Rng::seed_from_u64(5), ExperienceSystem::new())
    }

    #[test]
    fn curve_follows_multiplier() {
        let tuning = BalanceTable::default().player;
        assert_eq!(experience_for_level(1, &tuning), 100);
        assert_eq!(experience_for_level(2, &tuning), 150);
        assert_eq!(experience_for_level(3, &tuning), 225);
        assert_eq!(experience_for_level(4, &tuning), 337);
    }

    #[test]
    fn overflow_grants_multiple_levels() {
        let (mut world, balance, mut rng, mut xp) = setup();
        world.player.experience = 250;

        assert_eq!(xp.update(&mut world, &balance, &mut rng), 2);
        assert_eq!(world.player.level, 3);
        assert_eq!(world.player.experience, 0);
        assert_eq!(world.player.experience_to_next, 225);
        assert_eq!(xp.pending(), 2);
        assert_eq!(xp.choices().len(), 3);
        assert_eq!(world.score, 2 * 50 + 3 * 50);
    }

    #[test]
    fn each_level_up_draws_fresh_offers() {
        let (mut world, balance, mut rng, mut xp) = setup();
        world.player.experience = 100;
        xp.update(&mut world, &balance, &mut rng);
        let stale = xp.choices()[..1].to_vec();
        xp.force_choices(stale.clone(), 1);

        world.player.experience = 150;
        assert_eq!(xp.update(&mut world, &balance, &mut rng), 1);
        assert_eq!(xp.pending(), 2);
        assert_eq!(xp.choices().len(), 3);
        assert_ne!(xp.choices(), stale.as_slice());
    }

    #[test]
    fn level_up_heals_a_fifth_capped_at_max() {
        let (mut world, balance, mut rng, mut xp) = setup();
        world.player.body.health = 50.0;
        world.player.experience = 100;
        xp.update(&mut world, &balance, &mut rng);
        assert_eq!(world.player.body.health, 70.0);

        world.player.body.health = 95.0;
        world.player.experience = 150;
        xp.update(&mut world, &balance, &mut rng);
        assert_eq!(world.player.body.health, 100.0);
    }

    #[test]
    fn choices_skip_maxed_and_owned() {
        let (mut world, balance, mut rng, mut xp) = setup();
        for stat in StatUpgrade::ALL {
            world.player.upgrades.push(UpgradeRecord {
                kind: UpgradeKind::Stat(stat),
                level: balance.upgrade(stat).max_level,
            });
        }
        for kind in [WeaponKind::Fireball, WeaponKind::Lightning, WeaponKind::Blade] {
            world.player.weapons.push(Weapon::from_stats(kind, balance.weapon(kind)));
        }

        xp.generate_choices(&world.player, &balance, &mut rng);
        let ids: Vec<&str> = xp.choices().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["unlock_aura"]);
    }

    #[test]
    fn damage_upgrade_compounds() {
        let (mut world, balance, mut rng, mut xp) = setup();
        let offer = stat_offer(StatUpgrade::Damage, 1, 5, &balance);
        xp.force_choices(vec![offer.clone()], 2);
        assert!(xp.apply_upgrade(&mut world, &balance, &mut rng, "damage"));
        assert!((world.player.weapons[0].damage - 12.0).abs() < 1e-4);

        xp.force_choices(vec![offer], 1);
        assert!(xp.apply_upgrade(&mut world, &balance, &mut rng, "damage"));
        assert!((world.player.weapons[0].damage - 14.4).abs() < 1e-4);
        assert_eq!(xp.pending(), 0);
        assert!(xp.choices().is_empty());
        assert_eq!(world.player.upgrade_level(UpgradeKind::Stat(StatUpgrade::Damage)), 1);
    }

    #[test]
    fn unlock_adds_weapon_once_and_unknown_id_is_ignored() {
        let (mut world, balance, mut rng, mut xp) = setup();
        xp.force_choices(vec![unlock_offer(WeaponKind::Aura)], 1);

        assert!(!xp.apply_upgrade(&mut world, &balance, &mut rng, "nonsense"));
        assert_eq!(xp.pending(), 1);

        assert!(xp.apply_upgrade(&mut world, &balance, &mut rng, "unlock_aura"));
        assert!(world.player.owns_weapon(WeaponKind::Aura));
        assert_eq!(world.player.weapons.len(), 2);
        assert!(world
            .events
            .contains(&GameEvent::WeaponUnlocked { kind: WeaponKind::Aura }));
    }

    #[test]
    fn max_health_upgrade_grants_the_difference() {
        let mut player = Player::default();
        player.body.max_health = 100.0;
        player.body.health = 40.0;
        let effect = BalanceTable::default().upgrade_effect(StatUpgrade::MaxHealth);
        apply_effect(&mut player, &effect, &BalanceTable::default(), &mut Vec::new());
        assert_eq!(player.body.max_health, 120.0);
        assert_eq!(player.body.health, 60.0);
    }
}
