//! Middleware chains.
//!
//! A [`Plugin`] receives mutable state, shared configuration and a [`Next`]
//! continuation. It may work before and after awaiting the continuation, and
//! it must await it exactly once before returning successfully: `Next::run`
//! takes `self`, so a second call does not compile, and returning `Ok`
//! without having driven the rest of the chain to completion is reported as
//! [`BuilderError::ProtocolViolation`].
//!
//! ```rust
//! use async_trait::async_trait;
//! use sui_txn_builder::transaction::plugins::{Next, Plugin, PluginRunner};
//! use sui_txn_builder::BuilderResult;
//! use std::sync::Arc;
//!
//! struct Push(&'static str);
//!
//! #[async_trait]
//! impl Plugin<Vec<&'static str>, ()> for Push {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//!
//!     async fn run(
//!         &self,
//!         state: &mut Vec<&'static str>,
//!         config: &(),
//!         next: Next<'_, Vec<&'static str>, ()>,
//!     ) -> BuilderResult<()> {
//!         state.push(self.0);
//!         next.run(state, config).await
//!     }
//! }
//!
//! let runner = PluginRunner::new()
//!     .with(Arc::new(Push("a")))
//!     .with(Arc::new(Push("b")));
//! let mut state = Vec::new();
//! futures::executor::block_on(runner.run(&mut state, &())).unwrap();
//! assert_eq!(state, vec!["a", "b"]);
//! ```

use crate::error::{BuilderError, BuilderResult};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One step of a middleware chain.
#[async_trait]
pub trait Plugin<S, C>: Send + Sync {
    /// Name used in protocol violation reports and logs.
    fn name(&self) -> &str;

    async fn run(&self, state: &mut S, config: &C, next: Next<'_, S, C>) -> BuilderResult<()>;
}

/// The rest of a chain, handed to each plugin.
pub struct Next<'a, S, C> {
    rest: &'a [Arc<dyn Plugin<S, C>>],
    settled: &'a AtomicBool,
}

impl<S, C> fmt::Debug for Next<'_, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.rest.len())
            .finish()
    }
}

impl<'a, S, C> Next<'a, S, C>
where
    S: Send,
    C: Sync,
{
    /// Runs the remaining plugins and returns their outcome.
    pub async fn run(self, state: &mut S, config: &C) -> BuilderResult<()> {
        let result = dispatch(self.rest, state, config).await;
        self.settled.store(true, Ordering::SeqCst);
        result
    }

    /// Number of plugins after this one.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

fn dispatch<'a, S, C>(
    plugins: &'a [Arc<dyn Plugin<S, C>>],
    state: &'a mut S,
    config: &'a C,
) -> BoxFuture<'a, BuilderResult<()>>
where
    S: Send,
    C: Sync,
{
    Box::pin(async move {
        let Some((plugin, rest)) = plugins.split_first() else {
            return Ok(());
        };
        let settled = AtomicBool::new(false);
        plugin
            .run(
                state,
                config,
                Next {
                    rest,
                    settled: &settled,
                },
            )
            .await?;

        if !settled.load(Ordering::SeqCst) {
            return Err(BuilderError::protocol_violation(
                plugin.name(),
                "returned without completing the rest of the chain",
            ));
        }
        Ok(())
    })
}

/// An ordered middleware chain.
pub struct PluginRunner<S, C> {
    plugins: Vec<Arc<dyn Plugin<S, C>>>,
}

impl<S, C> Default for PluginRunner<S, C> {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }
}

impl<S, C> Clone for PluginRunner<S, C> {
    fn clone(&self) -> Self {
        Self {
            plugins: self.plugins.clone(),
        }
    }
}

impl<S, C> fmt::Debug for PluginRunner<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|plugin| plugin.name()))
            .finish()
    }
}

impl<S, C> PluginRunner<S, C>
where
    S: Send,
    C: Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, plugin: Arc<dyn Plugin<S, C>>) {
        self.plugins.push(plugin);
    }

    #[must_use]
    pub fn with(mut self, plugin: Arc<dyn Plugin<S, C>>) -> Self {
        self.push(plugin);
        self
    }

    pub fn extend(&mut self, plugins: impl IntoIterator<Item = Arc<dyn Plugin<S, C>>>) {
        self.plugins.extend(plugins);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Runs the chain in order. An empty chain completes immediately.
    pub async fn run(&self, state: &mut S, config: &C) -> BuilderResult<()> {
        dispatch(&self.plugins, state, config).await
    }
}

/// Plugins attached to one transaction builder.
///
/// Build plugins run before the resolution stages on every build. Intent
/// resolvers run first, and only when an intent with their name is present.
pub struct PluginRegistry<S, C> {
    build_plugins: Vec<Arc<dyn Plugin<S, C>>>,
    intent_resolvers: BTreeMap<String, Arc<dyn Plugin<S, C>>>,
}

impl<S, C> Default for PluginRegistry<S, C> {
    fn default() -> Self {
        Self {
            build_plugins: Vec::new(),
            intent_resolvers: BTreeMap::new(),
        }
    }
}

impl<S, C> Clone for PluginRegistry<S, C> {
    fn clone(&self) -> Self {
        Self {
            build_plugins: self.build_plugins.clone(),
            intent_resolvers: self.intent_resolvers.clone(),
        }
    }
}

impl<S, C> fmt::Debug for PluginRegistry<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field(
                "build_plugins",
                &self
                    .build_plugins
                    .iter()
                    .map(|plugin| plugin.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "intent_resolvers",
                &self.intent_resolvers.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<S, C> PluginRegistry<S, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_build_plugin(&mut self, plugin: Arc<dyn Plugin<S, C>>) {
        self.build_plugins.push(plugin);
    }

    /// Registers the resolver for intents named `name`.
    ///
    /// Registering the same resolver twice is a no-op; a different resolver
    /// for a taken name is rejected.
    pub fn add_intent_resolver(
        &mut self,
        name: impl Into<String>,
        resolver: Arc<dyn Plugin<S, C>>,
    ) -> BuilderResult<()> {
        let name = name.into();
        match self.intent_resolvers.get(&name) {
            Some(existing) if Arc::ptr_eq(existing, &resolver) => Ok(()),
            Some(_) => Err(BuilderError::Config(format!(
                "an intent resolver for {name} is already registered"
            ))),
            None => {
                self.intent_resolvers.insert(name, resolver);
                Ok(())
            }
        }
    }

    pub fn build_plugins(&self) -> &[Arc<dyn Plugin<S, C>>] {
        &self.build_plugins
    }

    pub fn intent_resolver(&self, name: &str) -> Option<&Arc<dyn Plugin<S, C>>> {
        self.intent_resolvers.get(name)
    }
}
