use crate::{ResolveContext, ResolveResult, Resolver};
use std::sync::Arc;
use stowage_errors::{Error, ResolveError};
use stowage_types::PackageSpec;

/// Tries resolvers in order, using the first that accepts the spec
#[derive(Clone, Default)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl ResolverChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }
}

#[async_trait::async_trait]
impl Resolver for ResolverChain {
    fn can_resolve(&self, spec: &PackageSpec) -> bool {
        self.resolvers.iter().any(|r| r.can_resolve(spec))
    }

    async fn resolve(
        &self,
        spec: &PackageSpec,
        ctx: &ResolveContext,
    ) -> Result<ResolveResult, Error> {
        match self.resolvers.iter().find(|r| r.can_resolve(spec)) {
            Some(resolver) => resolver.resolve(spec, ctx).await,
            None => Err(ResolveError::Unsupported {
                spec: spec.raw.clone(),
            }
            .into()),
        }
    }
}
