//! # Todolists Core
//!
//! Core traits and types for the todolists state layer.
//!
//! The state layer is built from a handful of abstractions:
//!
//! - **State**: the in-memory copy of server data plus client-only flags
//! - **Action**: every input to a reducer (commands, fulfilled events, rejections)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of asynchronous work, executed by the runtime
//! - **Environment**: injected dependencies such as the REST client
//!
//! Reducers never perform I/O. A command produces an [`Effect::Future`] that
//! talks to the backend and resolves to the next action, which the runtime
//! feeds back into the same reducer.
//!
//! ## Example
//!
//! ```
//! use todolists_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct Titles {
//!     items: Vec<String>,
//! }
//!
//! enum TitleAction {
//!     Add(String),
//!     Clear,
//! }
//!
//! struct TitleReducer;
//!
//! impl Reducer for TitleReducer {
//!     type State = Titles;
//!     type Action = TitleAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Titles,
//!         action: TitleAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TitleAction>; 4]> {
//!         match action {
//!             TitleAction::Add(title) => state.items.insert(0, title),
//!             TitleAction::Clear => state.items.clear(),
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = Titles::default();
//! let _ = TitleReducer.reduce(&mut state, TitleAction::Add("groceries".into()), &());
//! assert_eq!(state.items, vec!["groceries".to_string()]);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Effects returned from one reducer call
///
/// Reducers here return at most a couple of effects per action, so the list
/// stays inline.
pub type Effects<Action> = SmallVec<[effect::Effect<Action>; 4]>;

/// Reducer module - the trait holding all state transitions
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - the only place state changes
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer mutates
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: Injected dependencies (REST client, ...)
    ///
    /// Implementations must be deterministic for a given state and action and
    /// must not panic: a panicking reducer halts the store that owns it.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values. Returning one from a reducer does nothing by itself;
/// the runtime decides when and where to run it.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Boxed future resolving to an optional follow-up action
    pub type BoxedActionFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another, each to completion
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// If the future resolves to `Some`, the action is fed back into the reducer.
        Future(BoxedActionFuture<Action>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block as an effect
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                Effect::Future(_) => false,
            }
        }
    }
}
