//! Fixed timestep simulation tick
//!
//! One call advances a level deterministically: player input and physics,
//! projectiles in firing order, the kill check, fall animation and finally
//! the exit check.

use serde::{Deserialize, Serialize};

use super::cascade::ProjectileOutcome;
use super::state::{Level, SimEvent};
use super::tile::Polarity;
use crate::consts::FALL_ANIMATION_SPEED;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Horizontal control in [-1, 1]
    pub movement: f32,
    /// Jump held
    pub jump: bool,
    /// Crouch held; stops horizontal control and lowers the muzzle
    pub duck: bool,
    /// Fire a shot of this polarity (subject to the fire cooldown)
    pub fire: Option<Polarity>,
}

/// Advance the level by one fixed timestep
pub fn tick(level: &mut Level, input: &TickInput, dt: f32) {
    level.time_ticks += 1;

    // Reaching the exit freezes the level
    if level.reached_exit {
        return;
    }

    // A dead player keeps falling but ignores input
    if !level.player.alive {
        level.player.apply_physics(0.0, false, dt, &level.grid, &level.tuning);
        return;
    }

    update_player(level, input, dt);
    update_projectiles(level);

    if level.player.bounds().top() as f32 >= level.grid.pixel_height() {
        log::info!("Player fell out of the level at tick {}", level.time_ticks);
        level.player.kill();
        level.events.push(SimEvent::PlayerKilled);
    }

    level.entities.animate(FALL_ANIMATION_SPEED);

    debug_assert!(
        level.entities.validate(&level.grid).is_ok(),
        "entity index out of sync with grid: {:?}",
        level.entities.validate(&level.grid)
    );

    let exit_point = level.entities.exit().exit_point;
    if level.player.alive && level.player.on_ground && level.player.bounds().contains(exit_point) {
        log::info!("Exit reached at tick {}", level.time_ticks);
        level.reached_exit = true;
        level.events.push(SimEvent::ExitReached);
    }
}

/// Input, firing and movement for the player
fn update_player(level: &mut Level, input: &TickInput, dt: f32) {
    level.player.ducking = input.duck;
    level.player.time_since_shot += dt;

    // Shots leave before the player moves this tick
    if let Some(polarity) = input.fire {
        if level.player.time_since_shot >= level.tuning.fire_cooldown {
            level.spawn_projectile(polarity);
            level.player.time_since_shot = 0.0;
        }
    }

    let movement = if input.duck {
        0.0
    } else {
        input.movement.clamp(-1.0, 1.0)
    };
    let report = level
        .player
        .apply_physics(movement, input.jump, dt, &level.grid, &level.tuning);
    if report.jumped {
        level.events.push(SimEvent::Jumped);
    }
}

/// Step every live projectile once, in firing order, then drop the spent ones
fn update_projectiles(level: &mut Level) {
    level.cascade.begin_tick();
    let level_width = level.grid.pixel_width();

    for i in 0..level.projectiles.len() {
        let mut projectile = level.projectiles[i];
        if !projectile.advance(level_width) {
            projectile.live = false;
            level.events.push(SimEvent::ProjectileLeftLevel);
        } else if let ProjectileOutcome::Consumed(impact) =
            level
                .cascade
                .on_projectile_tick(&projectile, &mut level.grid, &mut level.entities)
        {
            projectile.live = false;
            level.events.push(SimEvent::Impact(impact));
        }
        level.projectiles[i] = projectile;
    }

    level.projectiles.retain(|p| p.live);
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, Vec2};

    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::bodies::Projectile;
    use crate::sim::cascade::Impact;
    use crate::sim::demo::DemoDriver;
    use crate::sim::entities::EntityKind;
    use crate::sim::tile::CollisionKind;
    use crate::tuning::Tuning;

    /// Player on the floor at column 0, stack in column 2 from row 11 down
    fn stack_level(stack: [char; 3]) -> Level {
        let mut rows = vec!["X..".to_string()];
        rows.extend((1..11).map(|_| "...".to_string()));
        rows.push(format!("..{}", stack[0]));
        rows.push(format!("..{}", stack[1]));
        rows.push(format!("1.{}", stack[2]));
        rows.push("###".to_string());
        Level::parse(&rows.join("\n"), Tuning::default()).unwrap()
    }

    fn duck_fire(polarity: Polarity) -> TickInput {
        TickInput {
            duck: true,
            fire: Some(polarity),
            ..Default::default()
        }
    }

    fn duck() -> TickInput {
        TickInput {
            duck: true,
            ..Default::default()
        }
    }

    fn run(level: &mut Level, input: &TickInput, ticks: usize) {
        for _ in 0..ticks {
            tick(level, input, SIM_DT);
        }
    }

    fn column(level: &Level, col: i32) -> Vec<CollisionKind> {
        (0..level.grid().height())
            .map(|row| level.collision_at(col, row))
            .collect()
    }

    #[test]
    fn test_neutralization_collapses_column() {
        let mut level = stack_level([':', '-', '+']);
        tick(&mut level, &duck_fire(Polarity::Negative), SIM_DT);
        assert_eq!(level.projectiles.len(), 1);
        run(&mut level, &duck(), 10);

        assert!(level.projectiles.is_empty());
        let col = column(&level, 2);
        assert_eq!(col[11], CollisionKind::Passable);
        assert_eq!(col[12], CollisionKind::EmptyTile);
        assert_eq!(col[13], CollisionKind::NegativeTile);
        assert_eq!(col[14], CollisionKind::Impassable);

        let events = level.drain_events();
        assert!(events.contains(&SimEvent::Impact(Impact::Neutralized {
            coord: IVec2::new(2, 13),
            shifted: 2,
        })));
        assert_eq!(level.entities().len(), 2);
        assert_eq!(level.entities().validate(level.grid()), Ok(()));
    }

    #[test]
    fn test_dropped_tiles_animate_into_place() {
        let mut level = stack_level(['.', '-', '+']);
        tick(&mut level, &duck_fire(Polarity::Negative), SIM_DT);
        run(&mut level, &duck(), 8);
        let dropped = level.entities().get(IVec2::new(2, 13)).unwrap();
        assert_eq!(dropped.kind, EntityKind::Charge(Polarity::Negative));
        assert!(dropped.motion.position.y < dropped.motion.target.y);

        // 48 px at 8 px per tick
        run(&mut level, &duck(), 6);
        let dropped = level.entities().get(IVec2::new(2, 13)).unwrap();
        assert!(dropped.motion.is_settled());
    }

    #[test]
    fn test_shot_fills_empty_slot() {
        let mut level = stack_level(['.', '.', ':']);
        tick(&mut level, &duck_fire(Polarity::Positive), SIM_DT);
        run(&mut level, &duck(), 10);

        assert_eq!(level.collision_at(2, 13), CollisionKind::PositiveTile);
        assert_eq!(level.entities().charge_at(IVec2::new(2, 13)), Some(Polarity::Positive));
        assert!(level.entities().get(IVec2::new(2, 13)).unwrap().motion.is_settled());
        assert!(level.drain_events().contains(&SimEvent::Impact(Impact::SlotFilled {
            coord: IVec2::new(2, 13),
            polarity: Polarity::Positive,
        })));
    }

    #[test]
    fn test_same_polarity_absorbs_shot() {
        let mut level = stack_level(['.', '.', '+']);
        tick(&mut level, &duck_fire(Polarity::Positive), SIM_DT);
        run(&mut level, &duck(), 10);

        assert!(level.projectiles.is_empty());
        assert_eq!(level.collision_at(2, 13), CollisionKind::PositiveTile);
        assert!(level.drain_events().contains(&SimEvent::Impact(Impact::Absorbed {
            coord: IVec2::new(2, 13),
        })));
    }

    #[test]
    fn test_projectile_leaves_level() {
        let mut level = stack_level(['.', '.', '.']);
        let before = level.grid().clone();
        level.projectiles.push(Projectile {
            position: Vec2::new(140.0, 100.0),
            polarity: Polarity::Positive,
            direction: 1.0,
            live: true,
        });
        tick(&mut level, &TickInput::default(), SIM_DT);

        assert!(level.projectiles.is_empty());
        assert_eq!(level.grid(), &before);
        assert_eq!(level.drain_events(), vec![SimEvent::ProjectileLeftLevel]);
    }

    #[test]
    fn test_projectiles_resolve_in_firing_order() {
        // Both shots probe the positive charge on the same tick
        let mut level = stack_level(['.', '-', '+']);
        for polarity in [Polarity::Negative, Polarity::Positive] {
            level.projectiles.push(Projectile {
                position: Vec2::new(80.0, 630.0),
                polarity,
                direction: 1.0,
                live: true,
            });
        }
        tick(&mut level, &duck(), SIM_DT);

        // The first shot clears (2, 13) and the negative drops in; the second
        // then meets its opposite and neutralizes that too
        assert!(level.projectiles.is_empty());
        assert_eq!(level.collision_at(2, 13), CollisionKind::Passable);
        assert_eq!(level.collision_at(2, 12), CollisionKind::Passable);
        let impacts: Vec<_> = level
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::Impact(_)))
            .collect();
        assert_eq!(impacts.len(), 2);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut level = stack_level(['.', '.', '.']);
        let hold = TickInput {
            fire: Some(Polarity::Positive),
            ..Default::default()
        };
        // 0.3 s at 60 Hz: one shot right away, then nothing for 17 ticks
        run(&mut level, &hold, 18);
        let fired = |events: &[SimEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, SimEvent::ProjectileFired { .. }))
                .count()
        };
        assert_eq!(fired(&level.drain_events()), 1);
        run(&mut level, &hold, 2);
        assert_eq!(fired(&level.drain_events()), 1);
    }

    #[test]
    fn test_player_dies_below_level() {
        let mut level = Level::parse("X..\n.1.\n...", Tuning::default()).unwrap();
        run(&mut level, &TickInput::default(), 120);

        assert!(!level.is_player_alive());
        let kills = level
            .drain_events()
            .into_iter()
            .filter(|e| *e == SimEvent::PlayerKilled)
            .count();
        assert_eq!(kills, 1);

        // Dead bodies keep falling, input is ignored
        let y = level.player.position().y;
        tick(&mut level, &duck_fire(Polarity::Positive), SIM_DT);
        assert!(level.player.position().y > y);
        assert!(level.projectiles.is_empty());

        level.restart();
        assert!(level.is_player_alive());
    }

    #[test]
    fn test_walking_into_exit_freezes_level() {
        let mut level = Level::parse("....\n1.X.\n####", Tuning::default()).unwrap();
        let walk = TickInput {
            movement: 1.0,
            ..Default::default()
        };
        let mut ticks = 0;
        while !level.has_reached_exit() && ticks < 120 {
            tick(&mut level, &walk, SIM_DT);
            ticks += 1;
        }
        assert!(level.has_reached_exit());
        assert!(level.drain_events().contains(&SimEvent::ExitReached));

        let frozen = level.player.clone();
        run(&mut level, &walk, 10);
        assert_eq!(level.player, frozen);
        assert!(level.drain_events().is_empty());
    }

    #[test]
    fn test_same_inputs_same_outcome() {
        let text = "\
X.......
....+...
.:..-..F
1.#.+.-.
########";
        let play = |seed| {
            let mut level = Level::parse(text, Tuning::default()).unwrap();
            let mut driver = DemoDriver::new(seed);
            for _ in 0..600 {
                let input = driver.next_input(&level);
                tick(&mut level, &input, SIM_DT);
                if !level.is_player_alive() {
                    level.restart();
                }
            }
            serde_json::to_string(&level.snapshot()).unwrap()
        };
        assert_eq!(play(7), play(7));
    }
}
