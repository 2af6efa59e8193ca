use std::fmt::Write as _;

use order_core::model::Medal;
use services::{HintView, LevelSelectItem, Phase, SessionSnapshot, WinSummary};

fn medal_list(medals: &[Medal]) -> String {
    if medals.is_empty() {
        return "none".to_string();
    }
    medals
        .iter()
        .map(|medal| medal.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[must_use]
pub fn levels(items: &[LevelSelectItem]) -> String {
    let mut out = String::new();
    for item in items {
        let state = if item.is_locked {
            format!("locked, {} more points", item.points_missing)
        } else if item.is_completed {
            "done".to_string()
        } else {
            "open".to_string()
        };
        let special = if item.is_special { " *" } else { "" };
        let _ = writeln!(
            out,
            "{:>4}  {}{}  [{}]  {}",
            item.level_id, item.title, special, state, item.description
        );
    }
    out
}

#[must_use]
pub fn board(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "score {}  medals: {}",
        snapshot.total_score,
        medal_list(&snapshot.medals)
    );

    match snapshot.phase {
        Phase::Idle => {
            let _ = writeln!(out, "No level running. `levels` to pick one.");
            return out;
        }
        Phase::AllComplete => {
            let _ = writeln!(out, "Every level is done. Congratulations!");
            return out;
        }
        Phase::Playing | Phase::Won | Phase::Lost => {}
    }

    if let (Some(title), Some(description)) = (&snapshot.title, &snapshot.description) {
        let _ = writeln!(out, "{title}: {description}");
    }
    let _ = writeln!(out, "time left: {}s", snapshot.time_remaining);
    for (slot, card) in snapshot.cards.iter().enumerate() {
        let marker = if snapshot.incorrect_card_ids.contains(&card.id()) {
            "  x"
        } else {
            ""
        };
        let _ = writeln!(out, "  {:>2}. {}{}", slot + 1, card.value(), marker);
    }

    match snapshot.phase {
        Phase::Won => {
            if let Some(win) = &snapshot.win {
                out.push_str(&win_summary(win));
            }
        }
        Phase::Lost => {
            let _ = writeln!(out, "Time's up! `retry` or `exit`.");
        }
        _ => {}
    }
    out
}

#[must_use]
pub fn win_summary(win: &WinSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Solved! +{} points, +{} bonus. Medals: {}",
        win.points,
        win.bonus,
        medal_list(&win.medals)
    );
    if win.has_next_level {
        let _ = writeln!(out, "`next` for the next level.");
    } else {
        let _ = writeln!(out, "That was the last level. `next` to finish.");
    }
    out
}

#[must_use]
pub fn hint(hint: &HintView) -> String {
    let mut out = String::from("Solution:\n");
    for (slot, card) in hint.solved_order.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {}", slot + 1, card.value());
    }
    let _ = writeln!(out, "Did you know? {}", hint.fact);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_core::model::LevelId;

    #[test]
    fn levels_shows_lock_state() {
        let items = vec![LevelSelectItem {
            level_id: LevelId::new(101),
            index: 21,
            title: "Ultimate Challenge".into(),
            description: "Only for the best".into(),
            is_special: true,
            is_locked: true,
            is_completed: false,
            required_points: 500,
            points_missing: 360,
        }];
        let text = levels(&items);
        assert!(text.contains("Ultimate Challenge *"));
        assert!(text.contains("locked, 360 more points"));
    }

    #[test]
    fn win_summary_lists_medals() {
        let text = win_summary(&WinSummary {
            level_id: LevelId::new(0),
            points: 100,
            bonus: 40,
            medals: vec![Medal::Speedster, Medal::Bronze],
            has_next_level: true,
        });
        assert!(text.contains("+100 points, +40 bonus"));
        assert!(text.contains("speedster, bronze"));
    }
}
