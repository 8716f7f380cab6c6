use core::time::Duration;

use bevy::color::palettes::css::GOLD;
use bevy::prelude::*;

use crate::floating_score::{animate_floating_scores, spawn_floating_score};

/// Request to add points, sent by the games.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddScore(pub u32);

/// Raised with the signed difference whenever the total moves.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAdded(pub i64);

/// Raised with the new total whenever it is changed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    pub delta: i64,
    pub total: u32,
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    total: u32,
}

impl Score {
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Zero deltas are ignored.
    pub fn add(&mut self, delta: u32) -> Option<ScoreChange> {
        if delta == 0 {
            return None;
        }
        self.total = self.total.saturating_add(delta);
        Some(ScoreChange {
            delta: i64::from(delta),
            total: self.total,
        })
    }

    /// Sets an absolute total. The change is reported even when the delta is zero.
    pub fn set(&mut self, total: u32) -> ScoreChange {
        let delta = i64::from(total) - i64::from(self.total);
        self.total = total;
        ScoreChange { delta, total }
    }

    pub fn reset(&mut self) -> ScoreChange {
        self.set(0)
    }
}

#[derive(Resource, Debug, Clone)]
pub struct ScoreSettings {
    /// How long the "+N" text stays up, never below 0.1 seconds.
    pub delta_text_duration: f32,
    /// World position where the "+N" text appears.
    pub delta_anchor: Vec2,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            delta_text_duration: 1.5,
            delta_anchor: Vec2::new(0.0, 260.0),
        }
    }
}

impl ScoreSettings {
    fn delta_lifetime(&self) -> Duration {
        Duration::from_secs_f32(self.delta_text_duration.max(0.1))
    }
}

/// Marks the text node showing the running total.
#[derive(Component)]
pub struct ScoreText;

pub struct ScorePlugin;

impl Plugin for ScorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Score>()
            .init_resource::<ScoreSettings>()
            .add_event::<AddScore>()
            .add_event::<ScoreAdded>()
            .add_event::<ScoreChanged>()
            .add_systems(
                Update,
                (
                    apply_score,
                    (show_score_delta, update_score_text),
                    animate_floating_scores,
                )
                    .chain(),
            );
    }
}

pub fn spawn_score_text(commands: &mut Commands) {
    commands.spawn((
        Text::new(format_score(0)),
        TextFont {
            font_size: 28.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        ScoreText,
    ));
}

pub fn format_score(total: u32) -> String {
    let digits = total.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("Score: {grouped}")
}

fn apply_score(
    mut requests: EventReader<AddScore>,
    mut score: ResMut<Score>,
    mut added: EventWriter<ScoreAdded>,
    mut changed: EventWriter<ScoreChanged>,
) {
    let delta = requests
        .read()
        .fold(0_u32, |sum, AddScore(points)| sum.saturating_add(*points));

    if let Some(change) = score.add(delta) {
        added.send(ScoreAdded(change.delta));
        changed.send(ScoreChanged(change.total));
    }
}

fn show_score_delta(
    mut commands: Commands,
    mut added: EventReader<ScoreAdded>,
    settings: Res<ScoreSettings>,
) {
    for ScoreAdded(delta) in added.read() {
        if *delta > 0 {
            spawn_floating_score(
                &mut commands,
                settings.delta_anchor,
                &format!("+{delta}"),
                GOLD,
                settings.delta_lifetime(),
            );
        }
    }
}

fn update_score_text(
    mut changed: EventReader<ScoreChanged>,
    mut texts: Query<&mut Text, With<ScoreText>>,
) {
    let Some(ScoreChanged(total)) = changed.read().last() else {
        return;
    };
    for mut text in &mut texts {
        text.0 = format_score(*total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ignores_zero() {
        let mut score = Score::default();
        assert_eq!(score.add(0), None, "no change");
        assert_eq!(
            score.add(3),
            Some(ScoreChange { delta: 3, total: 3 }),
            "three points"
        );
    }

    #[test]
    fn set_reports_signed_delta() {
        let mut score = Score::default();
        score.add(10);
        assert_eq!(score.set(4), ScoreChange { delta: -6, total: 4 }, "went down");
        assert_eq!(score.reset(), ScoreChange { delta: -4, total: 0 }, "reset");
    }

    #[test]
    fn formats_with_thousands_separators() {
        assert_eq!(format_score(0), "Score: 0", "zero");
        assert_eq!(format_score(999), "Score: 999", "no separator");
        assert_eq!(format_score(1000), "Score: 1,000", "one separator");
        assert_eq!(format_score(12_345_678), "Score: 12,345,678", "two separators");
    }

    #[test]
    fn requests_in_one_frame_fold_into_one_change() {
        let mut app = App::new();
        app.init_resource::<Time>().add_plugins(ScorePlugin);

        app.world_mut().send_event(AddScore(1));
        app.world_mut().send_event(AddScore(1));
        app.world_mut().send_event(AddScore(1));
        app.update();

        assert_eq!(app.world().resource::<Score>().total(), 3, "all requests applied");

        let changes: Vec<ScoreChanged> = app
            .world_mut()
            .resource_mut::<Events<ScoreChanged>>()
            .drain()
            .collect();
        assert_eq!(changes, vec![ScoreChanged(3)], "one change event");
    }
}
