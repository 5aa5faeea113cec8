// Generic finite state machine with deferred transitions
//
// States are stateless singletons referenced by `&'static dyn State`. Anything
// a state needs to remember between calls lives on the user, so the same
// machine type can drive any number of instances.

use std::fmt::Debug;

use log::debug;

/// The object a machine drives. Implemented once per driven type; the
/// associated types pin down the state identity, transition arguments,
/// domain events and per-call environment.
pub trait MachineUser: Sized {
    /// State identity, used for comparisons and logging.
    type Id: Copy + PartialEq + Debug;
    /// Arguments handed to a state's `on_enter`.
    type Args: Default;
    /// Domain events forwarded to the current state through [`StateMachine::dispatch_event`].
    type Event;
    /// Per-call environment (physics scene access and the like), passed down
    /// by whoever ticks the machine.
    type Env<'e>;

    /// Current game-clock time in seconds, used to timestamp transitions.
    fn now(&self) -> f32;
}

pub type StateRef<U> = &'static dyn State<U>;

/// A state of the machine. All callbacks receive the machine itself so they
/// can request transitions; requests made while a transition is being
/// committed are dropped.
pub trait State<U: MachineUser>: Sync {
    fn id(&self) -> U::Id;

    fn on_enter(
        &self,
        _user: &mut U,
        _env: &mut U::Env<'_>,
        _machine: &mut StateMachine<U>,
        _previous: Option<U::Id>,
        _args: U::Args,
    ) {
    }

    fn on_exit(&self, _user: &mut U, _env: &mut U::Env<'_>, _machine: &mut StateMachine<U>, _next: U::Id) {}

    /// A state that wants per-frame updates returns itself here.
    fn as_update(&self) -> Option<&dyn UpdateState<U>> {
        None
    }

    /// A state that wants fixed-timestep updates returns itself here.
    fn as_fixed_update(&self) -> Option<&dyn FixedUpdateState<U>> {
        None
    }

    /// Domain event forwarded from the machine's single dispatch point.
    /// Returns whether the event was consumed.
    fn on_event(
        &self,
        _user: &mut U,
        _env: &mut U::Env<'_>,
        _machine: &mut StateMachine<U>,
        _event: &U::Event,
    ) -> bool {
        false
    }
}

pub trait UpdateState<U: MachineUser>: Sync {
    fn on_update(&self, user: &mut U, env: &mut U::Env<'_>, machine: &mut StateMachine<U>, dt: f32);
}

pub trait FixedUpdateState<U: MachineUser>: Sync {
    fn on_fixed_update(&self, user: &mut U, env: &mut U::Env<'_>, machine: &mut StateMachine<U>, dt: f32);
}

/// When a requested transition takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMode {
    /// The transition runs inside the `change_state` call.
    Immediate,
    /// The transition is parked in a single pending slot and committed at the
    /// end of the machine's `update`. The first request per frame wins.
    AtEndOfUpdate,
}

/// Called after a transition commits, with the new and previous state ids.
pub type StateChangedHook<U> = fn(&mut U, <U as MachineUser>::Id, Option<<U as MachineUser>::Id>);

pub struct StateMachine<U: MachineUser + 'static> {
    current: Option<StateRef<U>>,
    previous: Option<StateRef<U>>,
    pending: Option<(StateRef<U>, U::Args)>,
    committing: bool,
    mode: ChangeMode,
    changed_at: f32,
    state_changed: Option<StateChangedHook<U>>,
}

impl<U: MachineUser + 'static> StateMachine<U> {
    pub fn new(mode: ChangeMode) -> Self {
        Self {
            current: None,
            previous: None,
            pending: None,
            committing: false,
            mode,
            changed_at: 0.0,
            state_changed: None,
        }
    }

    /// Build a machine and enter `initial` right away, regardless of mode.
    pub fn with_initial(
        user: &mut U,
        env: &mut U::Env<'_>,
        mode: ChangeMode,
        initial: StateRef<U>,
        args: U::Args,
    ) -> Self {
        let mut machine = Self::new(mode);
        machine.change_state_exec(user, env, initial, args);
        machine
    }

    pub fn current_id(&self) -> Option<U::Id> {
        self.current.map(|s| s.id())
    }

    pub fn previous_id(&self) -> Option<U::Id> {
        self.previous.map(|s| s.id())
    }

    pub fn pending_id(&self) -> Option<U::Id> {
        self.pending.as_ref().map(|(s, _)| s.id())
    }

    pub fn is_pending_state_change(&self) -> bool {
        self.pending.is_some()
    }

    /// Seconds since the current state was entered.
    pub fn state_duration(&self, now: f32) -> f32 {
        now - self.changed_at
    }

    pub fn set_state_changed_hook(&mut self, hook: StateChangedHook<U>) {
        self.state_changed = Some(hook);
    }

    /// Request a transition. In deferred mode the request is dropped when a
    /// transition is already pending or currently committing.
    pub fn change_state(&mut self, user: &mut U, env: &mut U::Env<'_>, state: StateRef<U>, args: U::Args) {
        match self.mode {
            ChangeMode::AtEndOfUpdate => {
                if self.pending.is_some() || self.committing {
                    return;
                }
                self.pending = Some((state, args));
            }
            ChangeMode::Immediate => self.change_state_exec(user, env, state, args),
        }
    }

    /// Transition right now, discarding any pending request.
    pub fn change_state_immediately(
        &mut self,
        user: &mut U,
        env: &mut U::Env<'_>,
        state: StateRef<U>,
        args: U::Args,
    ) {
        self.pending = None;
        self.change_state_exec(user, env, state, args);
    }

    /// Per-frame tick: runs the current state's update, then commits the
    /// pending transition if any.
    pub fn update(&mut self, user: &mut U, env: &mut U::Env<'_>, dt: f32) {
        if let Some(state) = self.current {
            if let Some(update) = state.as_update() {
                update.on_update(user, env, self, dt);
            }
        }
        self.commit_pending(user, env);
    }

    /// Fixed-timestep tick. Pending transitions are not committed here; they
    /// wait for the next `update` so per-frame and physics-rate requests race
    /// on equal footing.
    pub fn fixed_update(&mut self, user: &mut U, env: &mut U::Env<'_>, dt: f32) {
        if let Some(state) = self.current {
            if let Some(fixed) = state.as_fixed_update() {
                fixed.on_fixed_update(user, env, self, dt);
            }
        }
    }

    /// Forward a domain event to the current state. Returns whether the state
    /// consumed it.
    pub fn dispatch_event(&mut self, user: &mut U, env: &mut U::Env<'_>, event: &U::Event) -> bool {
        if let Some(state) = self.current {
            state.on_event(user, env, self, event)
        } else {
            false
        }
    }

    fn commit_pending(&mut self, user: &mut U, env: &mut U::Env<'_>) {
        let Some((state, args)) = self.pending.take() else {
            return;
        };
        // Requests made from exit/enter callbacks during the commit are
        // dropped, matching the single-slot contract.
        self.committing = true;
        self.change_state_exec(user, env, state, args);
        self.committing = false;
    }

    fn change_state_exec(&mut self, user: &mut U, env: &mut U::Env<'_>, state: StateRef<U>, args: U::Args) {
        if let Some(current) = self.current {
            current.on_exit(user, env, self, state.id());
        }
        self.previous = self.current;
        self.current = Some(state);
        self.changed_at = user.now();
        let prev_id = self.previous.map(|s| s.id());
        debug!("state change: {:?} -> {:?}", prev_id, state.id());
        state.on_enter(user, env, self, prev_id, args);
        if let Some(hook) = self.state_changed {
            hook(user, state.id(), prev_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestUser {
        time: f32,
        log: Vec<String>,
    }

    impl MachineUser for TestUser {
        type Id = &'static str;
        type Args = i32;
        type Event = &'static str;
        type Env<'e> = ();

        fn now(&self) -> f32 {
            self.time
        }
    }

    struct Alpha;
    struct Beta;
    struct Greedy;

    impl State<TestUser> for Alpha {
        fn id(&self) -> &'static str {
            "alpha"
        }

        fn on_enter(
            &self,
            user: &mut TestUser,
            _env: &mut (),
            _machine: &mut StateMachine<TestUser>,
            _previous: Option<&'static str>,
            args: i32,
        ) {
            user.log.push(format!("enter alpha {args}"));
        }

        fn on_exit(&self, user: &mut TestUser, _env: &mut (), _machine: &mut StateMachine<TestUser>, next: &'static str) {
            user.log.push(format!("exit alpha -> {next}"));
        }

        fn as_update(&self) -> Option<&dyn UpdateState<TestUser>> {
            Some(self)
        }

        fn on_event(
            &self,
            user: &mut TestUser,
            env: &mut (),
            machine: &mut StateMachine<TestUser>,
            event: &&'static str,
        ) -> bool {
            if *event == "go-beta" {
                machine.change_state(user, env, &Beta, 0);
                true
            } else {
                false
            }
        }
    }

    impl UpdateState<TestUser> for Alpha {
        fn on_update(&self, user: &mut TestUser, env: &mut (), machine: &mut StateMachine<TestUser>, _dt: f32) {
            user.log.push("update alpha".into());
            machine.change_state(user, env, &Beta, 1);
            machine.change_state(user, env, &Greedy, 2);
        }
    }

    impl State<TestUser> for Beta {
        fn id(&self) -> &'static str {
            "beta"
        }

        fn on_enter(
            &self,
            user: &mut TestUser,
            env: &mut (),
            machine: &mut StateMachine<TestUser>,
            _previous: Option<&'static str>,
            args: i32,
        ) {
            user.log.push(format!("enter beta {args}"));
            // Requested mid-commit, must be dropped.
            machine.change_state(user, env, &Greedy, 9);
        }
    }

    impl State<TestUser> for Greedy {
        fn id(&self) -> &'static str {
            "greedy"
        }
    }

    #[test]
    fn test_first_request_wins_and_commits_after_update() {
        let mut user = TestUser::default();
        let mut machine =
            StateMachine::with_initial(&mut user, &mut (), ChangeMode::AtEndOfUpdate, &Alpha, 5);
        assert_eq!(machine.current_id(), Some("alpha"));

        machine.update(&mut user, &mut (), 0.016);

        assert_eq!(machine.current_id(), Some("beta"));
        assert_eq!(machine.previous_id(), Some("alpha"));
        assert_eq!(
            user.log,
            vec![
                "enter alpha 5",
                "update alpha",
                "exit alpha -> beta",
                "enter beta 1",
            ]
        );
        // Beta's mid-commit request must not survive the commit.
        assert!(!machine.is_pending_state_change());
    }

    #[test]
    fn test_immediate_mode_transitions_inline() {
        let mut user = TestUser::default();
        let mut machine = StateMachine::with_initial(&mut user, &mut (), ChangeMode::Immediate, &Alpha, 0);
        machine.change_state(&mut user, &mut (), &Greedy, 0);
        assert_eq!(machine.current_id(), Some("greedy"));
    }

    #[test]
    fn test_change_state_immediately_discards_pending() {
        let mut user = TestUser::default();
        let mut machine =
            StateMachine::with_initial(&mut user, &mut (), ChangeMode::AtEndOfUpdate, &Alpha, 0);
        machine.change_state(&mut user, &mut (), &Beta, 0);
        assert!(machine.is_pending_state_change());
        machine.change_state_immediately(&mut user, &mut (), &Greedy, 0);
        assert_eq!(machine.current_id(), Some("greedy"));
        assert!(!machine.is_pending_state_change());
    }

    #[test]
    fn test_state_duration_tracks_clock() {
        let mut user = TestUser::default();
        user.time = 2.0;
        let machine = StateMachine::with_initial(&mut user, &mut (), ChangeMode::AtEndOfUpdate, &Alpha, 0);
        user.time = 3.5;
        assert!((machine.state_duration(user.now()) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_dispatch_event_reaches_current_state() {
        let mut user = TestUser::default();
        let mut machine =
            StateMachine::with_initial(&mut user, &mut (), ChangeMode::AtEndOfUpdate, &Alpha, 0);
        assert!(machine.dispatch_event(&mut user, &mut (), &"go-beta"));
        assert!(!machine.dispatch_event(&mut user, &mut (), &"unknown"));
        assert_eq!(machine.pending_id(), Some("beta"));
    }

    #[test]
    fn test_state_changed_hook_runs_after_enter() {
        let mut user = TestUser::default();
        let mut machine =
            StateMachine::with_initial(&mut user, &mut (), ChangeMode::AtEndOfUpdate, &Alpha, 0);
        machine.set_state_changed_hook(|user, id, prev| {
            user.log.push(format!("hook {:?} from {:?}", id, prev));
        });
        machine.change_state(&mut user, &mut (), &Greedy, 0);
        machine.update(&mut user, &mut (), 0.016);
        assert!(user.log.iter().any(|l| l.contains("hook \"greedy\"")));
    }
}
