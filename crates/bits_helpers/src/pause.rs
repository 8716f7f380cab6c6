use bevy::prelude::*;
use bevy::utils::HashSet;

/// Source used by the pause key and `toggle`.
pub const GLOBAL_PAUSE: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseTransition {
    Paused,
    Resumed,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamePaused;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResumed;

/// The game is paused while at least one source holds it.
///
/// Sources are free-form names such as a menu or a dialog. Only the first pause and the last
/// resume report a transition.
#[derive(Resource, Debug, Default, Clone)]
pub struct PauseState {
    sources: HashSet<&'static str>,
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn is_paused_by(&self, source: &'static str) -> bool {
        self.sources.contains(source)
    }

    pub fn pause(&mut self, source: &'static str) -> Option<PauseTransition> {
        let was_paused = self.is_paused();
        self.sources.insert(source);
        (!was_paused).then_some(PauseTransition::Paused)
    }

    pub fn resume(&mut self, source: &'static str) -> Option<PauseTransition> {
        let was_paused = self.is_paused();
        self.sources.remove(source);
        (was_paused && !self.is_paused()).then_some(PauseTransition::Resumed)
    }

    /// Pauses with the global source, or clears every source if anything holds the game.
    pub fn toggle(&mut self) -> Option<PauseTransition> {
        if self.is_paused() {
            self.force_resume()
        } else {
            self.pause(GLOBAL_PAUSE)
        }
    }

    pub fn force_resume(&mut self) -> Option<PauseTransition> {
        let was_paused = self.is_paused();
        self.sources.clear();
        was_paused.then_some(PauseTransition::Resumed)
    }
}

/// Run condition for gameplay systems that must not see input while paused.
pub fn not_paused(pause: Res<PauseState>) -> bool {
    !pause.is_paused()
}

/// Key that toggles the global pause.
#[derive(Resource, Debug, Clone, Copy)]
pub struct PauseKey(pub KeyCode);

impl Default for PauseKey {
    fn default() -> Self {
        Self(KeyCode::Escape)
    }
}

pub struct PausePlugin;

impl Plugin for PausePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PauseState>()
            .init_resource::<PauseKey>()
            .add_event::<GamePaused>()
            .add_event::<GameResumed>()
            .add_systems(PreUpdate, handle_pause_key);
    }
}

fn handle_pause_key(
    keys: Res<ButtonInput<KeyCode>>,
    pause_key: Res<PauseKey>,
    mut pause: ResMut<PauseState>,
    mut time: ResMut<Time<Virtual>>,
    mut paused: EventWriter<GamePaused>,
    mut resumed: EventWriter<GameResumed>,
) {
    if !keys.just_pressed(pause_key.0) {
        return;
    }

    match pause.toggle() {
        Some(PauseTransition::Paused) => {
            info!("Game paused");
            time.pause();
            paused.send(GamePaused);
        }
        Some(PauseTransition::Resumed) => {
            info!("Game resumed");
            time.unpause();
            resumed.send(GameResumed);
        }
        None => {}
    }
}
