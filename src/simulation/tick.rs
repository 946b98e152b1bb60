use super::action::Action;
use crate::config::ArenaConfig;
use crate::world::entity::{Bullet, Direction, Prey};
use crate::world::rect::Rect;
use crate::world::{uniform_in, World};
use rand::Rng;

/// Edge of the arena a new prey enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnZone {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnZone {
    const ALL: [SpawnZone; 4] = [SpawnZone::Top, SpawnZone::Bottom, SpawnZone::Left, SpawnZone::Right];

    /// Heading that carries a prey from this edge into the arena.
    pub fn inward(self) -> Direction {
        match self {
            SpawnZone::Top => Direction::Down,
            SpawnZone::Bottom => Direction::Up,
            SpawnZone::Left => Direction::Right,
            SpawnZone::Right => Direction::Left,
        }
    }

    fn spawn_rect<R: Rng + ?Sized>(self, config: &ArenaConfig, rng: &mut R) -> Rect {
        let (w, h) = (config.prey_width, config.prey_height);
        let (x, y) = match self {
            SpawnZone::Top => (uniform_in(rng, 0.0, config.width - w), -h),
            SpawnZone::Bottom => (uniform_in(rng, 0.0, config.width - w), config.height),
            SpawnZone::Left => (-w, uniform_in(rng, 0.0, config.height - h)),
            SpawnZone::Right => (config.width, uniform_in(rng, 0.0, config.height - h)),
        };
        Rect::new(x.floor(), y.floor(), w, h)
    }
}

impl World {
    /// Advances the world one tick. Returns false once the tick limit is reached,
    /// in which case nothing else changes.
    pub fn tick<R: Rng + ?Sized>(&mut self, action: &Action, config: &ArenaConfig, rng: &mut R) -> bool {
        self.tick += 1;
        if self.is_finished() {
            return false;
        }
        self.last_action = *action;

        self.move_bullets(config);
        self.move_prey(config, rng);
        self.resolve_bullets(config);

        if rng.gen_bool(config.prey_spawn_chance) {
            self.spawn_prey(config, rng);
        }

        if let Some(direction) = action.direction() {
            self.hunter.direction = direction;
        }
        if action.toggle_moving {
            self.hunter.moving = !self.hunter.moving;
        }
        if self.hunter.moving {
            self.move_hunter(config);
        }
        if action.fire {
            self.fire();
            self.score += config.fire_reward;
        }

        true
    }

    fn move_bullets(&mut self, config: &ArenaConfig) {
        for bullet in &mut self.bullets {
            let (dx, dy) = bullet.direction.step(config.bullet_speed);
            bullet.rect = bullet.rect.translated(dx, dy);
        }
    }

    fn move_prey<R: Rng + ?Sized>(&mut self, config: &ArenaConfig, rng: &mut R) {
        for i in 0..self.prey.len() {
            if !self.prey[i].alive {
                continue;
            }

            if rng.gen_bool(config.prey_turn_chance) {
                self.prey[i].direction = Direction::random(rng);
            }

            let (dx, dy) = self.prey[i].direction.step(config.prey_speed);
            let candidate = self.prey[i].rect.translated(dx, dy);

            let blocked = candidate.overlaps(&self.hunter.rect)
                || self
                    .prey
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && candidate.overlaps(&other.rect))
                || candidate.collides_any(&self.obstacles);

            if !blocked {
                self.prey[i].rect = candidate;
            }
        }
    }

    /// Removes bullets that hit prey or obstacles or outlived their lifetime.
    fn resolve_bullets(&mut self, config: &ArenaConfig) {
        let bullets = std::mem::take(&mut self.bullets);
        let mut kept = Vec::with_capacity(bullets.len());

        for bullet in bullets {
            if let Some(hit) = bullet.rect.collide_index(self.prey.iter().map(|p| &p.rect)) {
                let prey = &mut self.prey[hit];
                if prey.alive {
                    prey.alive = false;
                    self.score += config.kill_bonus;
                }
                continue;
            }
            if bullet.rect.collides_any(&self.obstacles) {
                continue;
            }
            if bullet.age(self.tick) >= config.bullet_lifetime_ticks {
                continue;
            }
            kept.push(bullet);
        }

        self.bullets = kept;
    }

    fn spawn_prey<R: Rng + ?Sized>(&mut self, config: &ArenaConfig, rng: &mut R) {
        let zone = SpawnZone::ALL[rng.gen_range(0..SpawnZone::ALL.len())];
        let rect = zone.spawn_rect(config, rng);
        self.prey.push(Prey::new(rect, zone.inward()));
    }

    fn move_hunter(&mut self, config: &ArenaConfig) {
        let (dx, dy) = self.hunter.direction.step(config.hunter_speed);
        let candidate = self.hunter.rect.translated(dx, dy);

        let blocked = candidate.collides_any(self.prey.iter().map(|p| &p.rect))
            || candidate.collides_any(&self.walls)
            || candidate.collides_any(&self.obstacles);

        if !blocked {
            self.hunter.rect = candidate;
            self.score += config.move_reward;
        }
    }

    fn fire(&mut self) {
        let (x, y) = self.hunter.muzzle();
        self.bullets
            .push(Bullet::new(x, y, self.hunter.direction, self.tick));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rand::{rngs::StdRng, SeedableRng};

    /// Arena with no randomness in play: no spawning, no turning, no obstacles.
    fn calm_config() -> Config {
        let mut config = Config::default();
        config.arena.prey_spawn_chance = 0.0;
        config.arena.prey_turn_chance = 0.0;
        config.arena.obstacle_count = 0;
        config
    }

    fn calm_world(config: &Config) -> World {
        World::with_obstacles(&config.arena, Vec::new())
    }

    fn prey_at(config: &Config, x: f64, y: f64, direction: Direction) -> Prey {
        Prey::new(
            Rect::new(x, y, config.arena.prey_width, config.arena.prey_height),
            direction,
        )
    }

    #[test]
    fn test_tick_increments_and_stops_at_limit() {
        let mut config = calm_config();
        config.arena.max_ticks = 5;
        let mut world = calm_world(&config);
        let mut rng = StdRng::seed_from_u64(0);

        for expected in 1..5 {
            assert!(world.tick(&Action::IDLE, &config.arena, &mut rng));
            assert_eq!(world.tick, expected);
            assert!(!world.is_finished());
        }

        assert!(!world.tick(&Action::IDLE, &config.arena, &mut rng));
        assert_eq!(world.tick, 5);
        assert_eq!(world.ticks_remaining(), 0);
        assert!(world.is_finished());
    }

    #[test]
    fn test_terminal_tick_changes_nothing_else() {
        let mut config = calm_config();
        config.arena.max_ticks = 1;
        let mut world = calm_world(&config);
        let mut rng = StdRng::seed_from_u64(0);

        let fire = Action {
            fire: true,
            toggle_moving: true,
            ..Action::IDLE
        };
        assert!(!world.tick(&fire, &config.arena, &mut rng));
        assert!(world.bullets.is_empty());
        assert!(!world.hunter.moving);
        assert_eq!(world.score, 0);
        assert_eq!(world.last_action, Action::IDLE);
    }

    #[test]
    fn test_prey_blocked_by_hunter_stays_put() {
        let config = calm_config();
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(100.0, 100.0, 57.0, 46.0);
        world.prey.push(prey_at(&config, 110.0, 100.0, Direction::Left));
        let before = world.prey[0].rect;
        let mut rng = StdRng::seed_from_u64(3);

        assert!(world.tick(&Action::IDLE, &config.arena, &mut rng));

        assert_eq!(world.prey[0].rect, before);
        assert!(world.prey[0].alive);
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_prey_moves_when_clear() {
        let config = calm_config();
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(800.0, 400.0, 57.0, 46.0);
        world.prey.push(prey_at(&config, 300.0, 200.0, Direction::Right));
        world.prey.push(prey_at(&config, 300.0, 300.0, Direction::UpLeft));
        let mut rng = StdRng::seed_from_u64(3);

        world.tick(&Action::IDLE, &config.arena, &mut rng);

        assert_eq!(world.prey[0].rect.x, 305.0);
        assert_eq!(world.prey[0].rect.y, 200.0);
        let d = 5.0 / std::f64::consts::SQRT_2;
        assert!((world.prey[1].rect.x - (300.0 - d)).abs() < 1e-9);
        assert!((world.prey[1].rect.y - (300.0 - d)).abs() < 1e-9);
    }

    #[test]
    fn test_prey_blocked_by_dead_prey_and_obstacles() {
        let config = calm_config();
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(800.0, 400.0, 57.0, 46.0);

        let mut carcass = prey_at(&config, 368.0, 200.0, Direction::Left);
        carcass.alive = false;
        world.prey.push(carcass);
        world.prey.push(prey_at(&config, 300.0, 200.0, Direction::Right));

        world.obstacles.push(Rect::new(300.0, 242.0, 80.0, 80.0));
        world.prey.push(prey_at(&config, 500.0, 200.0, Direction::Down));
        world.obstacles.push(Rect::new(500.0, 242.0, 80.0, 80.0));

        let mut rng = StdRng::seed_from_u64(3);
        world.tick(&Action::IDLE, &config.arena, &mut rng);

        assert_eq!(world.prey[0].rect.x, 368.0);
        assert_eq!(world.prey[1].rect.x, 300.0);
        assert_eq!(world.prey[2].rect.y, 200.0);
    }

    #[test]
    fn test_bullet_lifetime() {
        let config = calm_config();
        let lifetime = config.arena.bullet_lifetime_ticks;
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(400.0, 300.0, 57.0, 46.0);
        let mut rng = StdRng::seed_from_u64(5);

        let fire = Action {
            fire: true,
            ..Action::IDLE
        };
        world.tick(&fire, &config.arena, &mut rng);
        let created = world.tick;
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].created_tick, created);

        while world.tick < created + lifetime - 1 {
            world.tick(&Action::IDLE, &config.arena, &mut rng);
            assert_eq!(world.bullets.len(), 1, "missing at tick {}", world.tick);
        }

        world.tick(&Action::IDLE, &config.arena, &mut rng);
        assert_eq!(world.tick, created + lifetime);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_kill_bonus_awarded_once() {
        let config = calm_config();
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(800.0, 400.0, 57.0, 46.0);
        world.prey.push(prey_at(&config, 300.0, 200.0, Direction::Up));
        // Pin the prey in place against an obstacle so the geometry stays fixed.
        world.obstacles.push(Rect::new(300.0, 120.0, 80.0, 80.0));

        // Both bullets land inside the prey after moving left by 10.
        world.bullets.push(Bullet::new(320.0, 210.0, Direction::Left, 0));
        world.bullets.push(Bullet::new(330.0, 220.0, Direction::Left, 0));

        let mut rng = StdRng::seed_from_u64(9);
        world.tick(&Action::IDLE, &config.arena, &mut rng);

        assert!(!world.prey[0].alive);
        assert_eq!(world.score, config.arena.kill_bonus);
        assert!(world.bullets.is_empty());

        world.bullets.push(Bullet::new(320.0, 210.0, Direction::Left, world.tick));
        world.tick(&Action::IDLE, &config.arena, &mut rng);

        assert!(world.bullets.is_empty());
        assert_eq!(world.score, config.arena.kill_bonus);
    }

    #[test]
    fn test_bullet_absorbed_by_obstacle() {
        let config = calm_config();
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(800.0, 400.0, 57.0, 46.0);
        world.obstacles.push(Rect::new(100.0, 100.0, 80.0, 80.0));
        world.bullets.push(Bullet::new(185.0, 120.0, Direction::Left, 0));

        let mut rng = StdRng::seed_from_u64(9);
        world.tick(&Action::IDLE, &config.arena, &mut rng);

        assert!(world.bullets.is_empty());
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_hunter_toggle_and_walls() {
        let config = calm_config();
        let mut world = calm_world(&config);
        let mut rng = StdRng::seed_from_u64(1);

        // Facing up at the origin: the top wall blocks the first step.
        let start = Action {
            toggle_moving: true,
            ..Action::IDLE
        };
        world.tick(&start, &config.arena, &mut rng);
        assert!(world.hunter.moving);
        assert_eq!(world.hunter.rect.y, 0.0);
        assert_eq!(world.score, 0);

        let right = Action {
            right: true,
            ..Action::IDLE
        };
        world.tick(&right, &config.arena, &mut rng);
        assert_eq!(world.hunter.direction, Direction::Right);
        assert_eq!(world.hunter.rect.x, 3.0);
        assert_eq!(world.score, config.arena.move_reward);

        world.tick(&start, &config.arena, &mut rng);
        assert!(!world.hunter.moving);
        world.tick(&Action::IDLE, &config.arena, &mut rng);
        assert_eq!(world.hunter.rect.x, 3.0);
    }

    #[test]
    fn test_hunter_blocked_by_prey() {
        let config = calm_config();
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(100.0, 100.0, 57.0, 46.0);
        world.hunter.moving = true;
        world.hunter.direction = Direction::Right;
        let mut carcass = prey_at(&config, 159.0, 100.0, Direction::Left);
        carcass.alive = false;
        world.prey.push(carcass);

        let mut rng = StdRng::seed_from_u64(1);
        world.tick(&Action::IDLE, &config.arena, &mut rng);

        assert_eq!(world.hunter.rect.x, 100.0);
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_fire_spawns_bullet_at_muzzle() {
        let config = calm_config();
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(400.0, 300.0, 57.0, 46.0);
        let mut rng = StdRng::seed_from_u64(1);

        let fire_down = Action {
            down: true,
            fire: true,
            ..Action::IDLE
        };
        world.tick(&fire_down, &config.arena, &mut rng);

        assert_eq!(world.bullets.len(), 1);
        let bullet = &world.bullets[0];
        assert_eq!(bullet.direction, Direction::Down);
        assert_eq!(bullet.created_tick, 1);
        assert_eq!((bullet.rect.x, bullet.rect.y), (418.0, 346.0));
        assert_eq!(world.score, config.arena.fire_reward);
        assert_eq!(world.last_action, fire_down);
    }

    #[test]
    fn test_spawned_prey_enter_from_edges() {
        let mut config = calm_config();
        config.arena.prey_spawn_chance = 1.0;
        let arena = config.arena.clone();
        let mut world = calm_world(&config);
        world.hunter.rect = Rect::new(450.0, 250.0, 57.0, 46.0);
        let mut rng = StdRng::seed_from_u64(11);

        world.tick(&Action::IDLE, &arena, &mut rng);
        assert_eq!(world.prey.len(), 1);

        let prey = &world.prey[0];
        assert!(prey.alive);
        match prey.direction {
            Direction::Down => assert_eq!(prey.rect.y, -arena.prey_height),
            Direction::Up => assert_eq!(prey.rect.y, arena.height),
            Direction::Right => assert_eq!(prey.rect.x, -arena.prey_width),
            Direction::Left => assert_eq!(prey.rect.x, arena.width),
            other => panic!("unexpected spawn direction {:?}", other),
        }
    }

    #[test]
    fn test_random_run_keeps_invariants() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(21);
        let mut world = World::new(&config.arena, &mut rng);
        let mut last_score = 0;

        let mut step = 0u64;
        loop {
            let action = Action {
                up: step % 7 == 0,
                right: step % 3 == 0,
                down: step % 11 == 0,
                left: step % 5 == 0,
                toggle_moving: step % 40 == 0,
                fire: step % 4 == 0,
            };
            if !world.tick(&action, &config.arena, &mut rng) {
                break;
            }
            step += 1;

            assert!(world.score >= last_score);
            last_score = world.score;
            assert!(!world.hunter.rect.collides_any(&world.walls));
        }

        assert_eq!(world.tick, config.arena.max_ticks);
    }
}
