//! Executing effects outside of a store
//!
//! Tests drive reducers directly and still need the futures inside
//! [`Effect::Future`] to run. These helpers do that on the current task.

use futures::future::{BoxFuture, join_all};
use std::collections::VecDeque;
use todolists_core::{Effects, effect::Effect, reducer::Reducer};

/// Execute an effect and collect the actions it produced
///
/// Parallel children run concurrently and their actions are returned in
/// declaration order. Sequential children run one after another. Produced
/// actions are *not* reduced between sequential steps.
pub fn execute<A>(effect: Effect<A>) -> BoxFuture<'static, Vec<A>>
where
    A: Send + 'static,
{
    Box::pin(async move {
        match effect {
            Effect::None => Vec::new(),
            Effect::Future(fut) => fut.await.into_iter().collect(),
            Effect::Parallel(effects) => join_all(effects.into_iter().map(execute))
                .await
                .into_iter()
                .flatten()
                .collect(),
            Effect::Sequential(effects) => {
                let mut actions = Vec::new();
                for effect in effects {
                    actions.extend(execute(effect).await);
                }
                actions
            },
        }
    })
}

/// Execute effects, reduce what they produce, repeat until nothing is left
///
/// Returns every produced action in the order it was reduced.
pub async fn run_to_completion<R>(
    reducer: &R,
    state: &mut R::State,
    env: &R::Environment,
    effects: Effects<R::Action>,
) -> Vec<R::Action>
where
    R: Reducer,
    R::Action: Clone + Send + 'static,
{
    let mut produced = Vec::new();
    let mut queue: VecDeque<Effect<R::Action>> = effects.into_iter().collect();

    while let Some(effect) = queue.pop_front() {
        for action in execute(effect).await {
            produced.push(action.clone());
            queue.extend(reducer.reduce(state, action, env));
        }
    }

    produced
}
