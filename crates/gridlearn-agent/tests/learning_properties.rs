//! End-to-end behaviour of the tabular agent

use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use gridlearn_agent::prelude::*;
use gridlearn_core::EventKind;
use statrs::distribution::{ChiSquared, ContinuousCDF};

const ACTIONS: [&str; 4] = ["up", "down", "left", "right"];

fn config(algorithm: Algorithm, epsilon: f64) -> AgentConfig<&'static str> {
    AgentConfig::new(3, 3, ACTIONS.to_vec())
        .unwrap()
        .with_alpha(0.5)
        .with_gamma(0.9)
        .with_epsilon(epsilon)
        .with_algorithm(algorithm)
}

fn agent(algorithm: Algorithm) -> TabularAgent<&'static str> {
    TabularAgent::seeded(config(algorithm, 0.0), 2024).unwrap()
}

#[test]
fn unwritten_pairs_read_zero() {
    let mut agent = agent(Algorithm::QLearning);
    for x in 0..3 {
        for y in 0..3 {
            for action in &ACTIONS {
                assert_eq!(agent.q_value(GridPos::new(x, y), action).unwrap(), 0.0);
            }
        }
    }
    assert_eq!(agent.values().len(), 3 * 3 * ACTIONS.len());
}

#[test]
fn qlearning_end_to_end() {
    let mut agent = agent(Algorithm::QLearning);
    let origin = GridPos::new(0, 0);
    let next = GridPos::new(1, 0);

    agent.update(origin, &"right", 1.0, next, None).unwrap();
    assert_abs_diff_eq!(agent.q_value(origin, &"right").unwrap(), 0.5, epsilon = 1e-9);

    agent.update(origin, &"right", 1.0, next, None).unwrap();
    assert_abs_diff_eq!(agent.q_value(origin, &"right").unwrap(), 0.75, epsilon = 1e-9);
}

#[test]
fn qlearning_bootstraps_from_greedy_value() {
    let mut agent = agent(Algorithm::QLearning);
    let s = GridPos::new(1, 1);
    let next = GridPos::new(2, 1);
    agent.set_q_value(s, &"left", 0.4).unwrap();
    agent.set_q_value(next, &"up", -1.0).unwrap();
    agent.set_q_value(next, &"down", 3.0).unwrap();

    let new_q = agent.update(s, &"left", 0.5, next, None).unwrap();
    let expected = 0.4 + 0.5 * (0.5 + 0.9 * 3.0 - 0.4);
    assert_abs_diff_eq!(new_q, expected, epsilon = 1e-9);
    assert_abs_diff_eq!(agent.peek(s, &"left").unwrap(), expected, epsilon = 1e-9);
}

#[test]
fn qlearning_ignores_next_action() {
    let mut results = Vec::new();
    for next_action in [None, Some(&"up"), Some(&"down"), Some(&"right")] {
        let mut agent = agent(Algorithm::QLearning);
        agent.set_q_value(GridPos::new(1, 0), &"down", 2.0).unwrap();
        agent.set_q_value(GridPos::new(1, 0), &"up", -2.0).unwrap();
        results.push(
            agent
                .update(GridPos::new(0, 0), &"right", 1.0, GridPos::new(1, 0), next_action)
                .unwrap(),
        );
    }
    for value in &results {
        assert_abs_diff_eq!(*value, results[0], epsilon = 1e-12);
    }
}

#[test]
fn sarsa_end_to_end() {
    let mut agent = agent(Algorithm::Sarsa);
    agent.set_q_value(GridPos::new(1, 0), &"down", 2.0).unwrap();

    agent
        .update(GridPos::new(0, 0), &"right", 1.0, GridPos::new(1, 0), Some(&"down"))
        .unwrap();
    assert_abs_diff_eq!(
        agent.q_value(GridPos::new(0, 0), &"right").unwrap(),
        1.4,
        epsilon = 1e-9
    );
}

#[test]
fn sarsa_depends_on_next_action() {
    let run = |next_action: Option<&'static str>| {
        let mut agent = agent(Algorithm::Sarsa);
        agent.set_q_value(GridPos::new(0, 0), &"right", 0.2).unwrap();
        agent.set_q_value(GridPos::new(1, 0), &"down", 2.0).unwrap();
        agent.set_q_value(GridPos::new(1, 0), &"left", -1.0).unwrap();
        agent
            .update(GridPos::new(0, 0), &"right", 1.0, GridPos::new(1, 0), next_action.as_ref())
            .unwrap()
    };

    assert_abs_diff_eq!(run(Some("down")), 0.2 + 0.5 * (1.0 + 0.9 * 2.0 - 0.2), epsilon = 1e-9);
    assert_abs_diff_eq!(run(Some("left")), 0.2 + 0.5 * (1.0 - 0.9 - 0.2), epsilon = 1e-9);
    // Terminal convention: no bootstrap
    assert_abs_diff_eq!(run(None), 0.2 + 0.5 * (1.0 - 0.2), epsilon = 1e-9);
}

#[test]
fn greedy_choice_is_deterministic() {
    let mut agent = agent(Algorithm::QLearning);
    let s = GridPos::new(2, 0);
    agent.set_q_value(s, &"left", 0.01).unwrap();
    for _ in 0..500 {
        assert_eq!(agent.choose_action(s).unwrap(), "left");
    }
}

#[test]
fn exploration_is_uniform() {
    let mut agent = TabularAgent::seeded(config(Algorithm::QLearning, 1.0), 99).unwrap();
    let s = GridPos::new(1, 2);
    agent.set_q_value(s, &"up", 10.0).unwrap();

    let trials = 8_000;
    let mut counts = [0u32; 4];
    for _ in 0..trials {
        let action = agent.choose_action(s).unwrap();
        let index = ACTIONS.iter().position(|a| *a == action).unwrap();
        counts[index] += 1;
    }

    let expected = f64::from(trials) / 4.0;
    let chi2: f64 = counts
        .iter()
        .map(|&c| (f64::from(c) - expected).powi(2) / expected)
        .sum();
    let critical = ChiSquared::new(3.0).unwrap().inverse_cdf(0.999);
    assert!(chi2 < critical, "counts {counts:?}, chi2 {chi2} >= {critical}");
}

#[test]
fn unvisited_state_ties_cover_every_action() {
    let mut agent = agent(Algorithm::QLearning);
    let s = GridPos::new(2, 2);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..400 {
        seen.insert(agent.choose_action(s).unwrap());
    }
    assert_eq!(seen.len(), ACTIONS.len());
}

#[test]
fn reset_episode_bookkeeping() {
    let mut agent = agent(Algorithm::QLearning);
    let rewards = [[1.0, -0.5], [0.0, 2.0], [3.0, 3.0]];

    for (i, episode) in rewards.iter().enumerate() {
        agent
            .update(GridPos::new(0, 0), &"right", episode[0], GridPos::new(1, 0), None)
            .unwrap();
        agent
            .update(GridPos::new(1, 0), &"down", episode[1], GridPos::new(1, 1), None)
            .unwrap();
        assert_abs_diff_eq!(agent.current_episode_reward(), episode[0] + episode[1]);

        let count = agent.reset_episode().unwrap();
        assert_eq!(count, i as u64 + 1);
        assert_eq!(agent.episode_count(), count);
        assert_eq!(agent.reward_history().len() as u64, agent.episode_count());
        assert_eq!(agent.current_episode_reward(), 0.0);
        assert_eq!(agent.position(), GridPos::ORIGIN);
    }

    assert_eq!(agent.reward_history(), &[0.5, 2.0, 6.0]);
    let stats = agent.episode_stats().unwrap();
    assert_eq!(stats.episodes, 3);
    assert_abs_diff_eq!(stats.best, 6.0);
    assert_abs_diff_eq!(stats.worst, 0.5);
}

#[test]
fn empty_episode_records_zero() {
    let mut agent = agent(Algorithm::Sarsa);
    agent.reset_episode().unwrap();
    assert_eq!(agent.reward_history(), &[0.0]);
}

#[test]
fn position_is_a_copy() {
    let mut agent = agent(Algorithm::QLearning);
    let mut next = GridPos::new(2, 1);
    agent.update(GridPos::new(1, 1), &"right", 0.0, next, None).unwrap();
    next.x = 0;
    assert_eq!(agent.position(), GridPos::new(2, 1));

    let mut seen = agent.position();
    seen.y = 0;
    assert_eq!(agent.position(), GridPos::new(2, 1));
}

#[test]
fn events_fire_in_order() {
    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut agent = agent(Algorithm::Sarsa);

    for id in ["a", "b"] {
        let log = Arc::clone(&log);
        agent.on_reward(move |event| {
            log.lock().unwrap().push(format!(
                "reward:{id}:{}:{}:{}:{}",
                event.reward, event.state, event.action, event.next_state
            ));
            Ok(())
        });
    }
    let sink = Arc::clone(&log);
    agent.on_step(move |pos| {
        sink.lock().unwrap().push(format!("step:{pos}"));
        Ok(())
    });
    let sink = Arc::clone(&log);
    agent.on_episode_end(move |episode| {
        sink.lock().unwrap().push(format!("end:{episode}"));
        Ok(())
    });

    agent
        .update(GridPos::new(0, 0), &"right", 1.0, GridPos::new(1, 0), Some(&"down"))
        .unwrap();
    agent.reset_episode().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "reward:a:1:(0, 0):right:(1, 0)",
            "reward:b:1:(0, 0):right:(1, 0)",
            "step:(1, 0)",
            "end:1",
        ]
    );
}

#[test]
fn qlearning_fires_no_step_events() {
    let steps = Arc::new(Mutex::new(0));
    let mut agent = agent(Algorithm::QLearning);
    let sink = Arc::clone(&steps);
    agent.on_step(move |_| {
        *sink.lock().unwrap() += 1;
        Ok(())
    });
    agent
        .update(GridPos::new(0, 0), &"up", 0.0, GridPos::new(0, 1), None)
        .unwrap();
    assert_eq!(*steps.lock().unwrap(), 0);
}

#[test]
fn observer_failure_keeps_update() {
    let later = Arc::new(Mutex::new(0));
    let mut agent = agent(Algorithm::QLearning);
    agent.on_reward(|_| Err(anyhow::anyhow!("observer broke")));
    let sink = Arc::clone(&later);
    agent.on_reward(move |_| {
        *sink.lock().unwrap() += 1;
        Ok(())
    });

    let err = agent
        .update(GridPos::new(0, 0), &"right", 1.0, GridPos::new(1, 0), None)
        .unwrap_err();
    assert!(matches!(err, LearnError::Observer { event: EventKind::Reward, .. }));

    assert_eq!(*later.lock().unwrap(), 0);
    assert_abs_diff_eq!(agent.peek(GridPos::new(0, 0), &"right").unwrap(), 0.5);
    assert_eq!(agent.position(), GridPos::new(1, 0));
    assert_eq!(agent.last_reward(), 1.0);
    assert_abs_diff_eq!(agent.current_episode_reward(), 1.0);
}

#[test]
fn observer_failure_keeps_reset() {
    let mut agent = agent(Algorithm::QLearning);
    agent.on_episode_end(|_| Err(anyhow::anyhow!("nope")));
    agent
        .update(GridPos::new(0, 0), &"right", 2.0, GridPos::new(1, 0), None)
        .unwrap();

    assert!(agent.reset_episode().is_err());
    assert_eq!(agent.episode_count(), 1);
    assert_eq!(agent.reward_history(), &[2.0]);
    assert_eq!(agent.position(), GridPos::ORIGIN);
}

#[test]
fn same_seed_same_trajectory() {
    let run = |seed| {
        let mut agent = TabularAgent::seeded(config(Algorithm::Sarsa, 0.3), seed).unwrap();
        let mut pos = GridPos::ORIGIN;
        let mut action = agent.choose_action(pos).unwrap();
        let mut picks = Vec::new();
        for _ in 0..40 {
            let next = match action {
                "right" => GridPos::new((pos.x + 1).min(2), pos.y),
                "left" => GridPos::new((pos.x - 1).max(0), pos.y),
                "down" => GridPos::new(pos.x, (pos.y + 1).min(2)),
                _ => GridPos::new(pos.x, (pos.y - 1).max(0)),
            };
            let next_action = agent.choose_action(next).unwrap();
            agent.update(pos, &action, -0.1, next, Some(&next_action)).unwrap();
            picks.push(action);
            pos = next;
            action = next_action;
        }
        (picks, agent.export_values())
    };
    assert_eq!(run(5), run(5));
}

#[test]
fn config_from_json_builds_agent() {
    let config = AgentConfig::<String>::from_json(
        r#"{"grid_width": 5, "grid_height": 5, "actions": ["n", "s", "e", "w"], "algorithm": "sarsa"}"#,
    )
    .unwrap();
    let agent = TabularAgent::seeded(config, 0).unwrap();
    assert_eq!(agent.algorithm(), Algorithm::Sarsa);
    assert_abs_diff_eq!(agent.config().epsilon, 0.2);
}
