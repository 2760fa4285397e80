//! Example: Q-learning and SARSA agents walking a 6x2 corridor
//!
//! The goal sits at the far end of the top row. Every move costs 0.1 and
//! reaching the goal pays 1.0. Run with `RUST_LOG=gridlearn_agent=debug` to
//! see every update.

use gridlearn_agent::prelude::*;
use tracing_subscriber::EnvFilter;

const WIDTH: u32 = 6;
const HEIGHT: u32 = 2;
const GOAL: GridPos = GridPos::new(5, 0);
const MAX_STEPS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Move {
    Up,
    Down,
    Left,
    Right,
}

fn step(pos: GridPos, mv: Move) -> (GridPos, f64, bool) {
    let (dx, dy) = match mv {
        Move::Up => (0, -1),
        Move::Down => (0, 1),
        Move::Left => (-1, 0),
        Move::Right => (1, 0),
    };
    let next = GridPos::new(
        (pos.x + dx).clamp(0, WIDTH as i32 - 1),
        (pos.y + dy).clamp(0, HEIGHT as i32 - 1),
    );
    if next == GOAL {
        (next, 1.0, true)
    } else {
        (next, -0.1, false)
    }
}

fn train(algorithm: Algorithm, episodes: usize) -> Result<TabularAgent<Move>> {
    let config = AgentConfig::new(WIDTH, HEIGHT, vec![Move::Up, Move::Down, Move::Left, Move::Right])?
        .with_alpha(0.5)
        .with_epsilon(0.1)
        .with_algorithm(algorithm);
    let mut agent = TabularAgent::seeded(config, 7)?;

    agent.on_episode_end(|episode| {
        if episode % 50 == 0 {
            tracing::info!(episode, "checkpoint");
        }
        Ok(())
    });

    for _ in 0..episodes {
        let mut pos = agent.position();
        let mut action = agent.choose_action(pos)?;
        for _ in 0..MAX_STEPS {
            let (next, reward, done) = step(pos, action);
            if done {
                agent.update(pos, &action, reward, next, None)?;
                break;
            }
            let next_action = agent.choose_action(next)?;
            agent.update(pos, &action, reward, next, Some(&next_action))?;
            pos = next;
            action = next_action;
        }
        agent.reset_episode()?;
    }

    Ok(agent)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    for algorithm in [Algorithm::QLearning, Algorithm::Sarsa] {
        let agent = train(algorithm, 200)?;
        let stats = agent.episode_stats().ok_or("no episodes recorded")?;
        println!(
            "{algorithm}: mean reward {:.3} (std {:.3}), best {:.2}, last {:.2}, table size {}",
            stats.mean,
            stats.std_dev,
            stats.best,
            stats.last,
            agent.values().len()
        );

        for y in 0..HEIGHT as i32 {
            let row: Vec<String> = (0..WIDTH as i32)
                .map(|x| {
                    let pos = GridPos::new(x, y);
                    if pos == GOAL {
                        return "G".to_string();
                    }
                    match agent.greedy_action(pos) {
                        Ok(Move::Up) => "^",
                        Ok(Move::Down) => "v",
                        Ok(Move::Left) => "<",
                        Ok(Move::Right) => ">",
                        Err(_) => "?",
                    }
                    .to_string()
                })
                .collect();
            println!("  {}", row.join(" "));
        }
    }

    Ok(())
}
