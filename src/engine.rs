//! Engine
//!
//! Fans the discount lookups out in parallel, keeps whatever arrives in
//! request order, and resolves the cart against the eligible rules. Lookup
//! failures shrink the eligible set; they never fail the calculation.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use tokio::{task::JoinSet, time::timeout};
use tracing::warn;

use crate::{
    cache::DiscountCache,
    carts::Cart,
    discounts::{DiscountId, DiscountRule, wire::RawDiscount},
    repository::DiscountRepository,
    resolution::{
        CartResolution, ResolveError,
        lines::{LineResolution, resolve_line_discounts},
        resolve_cart_discount,
    },
};

/// Time allowed for each individual discount lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Discount resolution over a lookup repository.
#[derive(Debug)]
pub struct DiscountEngine<R> {
    repository: Arc<R>,
    lookup_timeout: Duration,
}

impl<R> DiscountEngine<R>
where
    R: DiscountRepository + 'static,
{
    /// Create an engine with the default per-lookup timeout.
    pub fn new(repository: R) -> Self {
        Self::with_lookup_timeout(repository, DEFAULT_LOOKUP_TIMEOUT)
    }

    /// Create an engine with a custom per-lookup timeout.
    pub fn with_lookup_timeout(repository: R, lookup_timeout: Duration) -> Self {
        Self {
            repository: Arc::new(repository),
            lookup_timeout,
        }
    }

    /// Resolve the best cart-level discount as of the current moment.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if resolution against the fetched rules fails.
    pub async fn cart_discount<'a>(
        &self,
        cart: &'a Cart<'a>,
        ids: &[DiscountId],
    ) -> Result<CartResolution<'a>, ResolveError> {
        self.cart_discount_at(cart, ids, Timestamp::now()).await
    }

    /// Resolve the best cart-level discount at a point in time.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if resolution against the fetched rules fails.
    #[tracing::instrument(
        name = "engine.cart_discount",
        skip(self, cart, ids),
        fields(candidates = ids.len())
    )]
    pub async fn cart_discount_at<'a>(
        &self,
        cart: &'a Cart<'a>,
        ids: &[DiscountId],
        point_in_time: Timestamp,
    ) -> Result<CartResolution<'a>, ResolveError> {
        let rules = self.eligible_rules(ids, point_in_time).await;

        resolve_cart_discount(cart, &rules)
    }

    /// Resolve an independent best discount for each cart line as of the
    /// current moment.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if resolution against the fetched rules fails.
    pub async fn line_discounts<'a>(
        &self,
        cart: &'a Cart<'a>,
        ids: &[DiscountId],
    ) -> Result<LineResolution<'a>, ResolveError> {
        self.line_discounts_at(cart, ids, Timestamp::now()).await
    }

    /// Resolve an independent best discount for each cart line at a point in
    /// time.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if resolution against the fetched rules fails.
    #[tracing::instrument(
        name = "engine.line_discounts",
        skip(self, cart, ids),
        fields(candidates = ids.len())
    )]
    pub async fn line_discounts_at<'a>(
        &self,
        cart: &'a Cart<'a>,
        ids: &[DiscountId],
        point_in_time: Timestamp,
    ) -> Result<LineResolution<'a>, ResolveError> {
        let rules = self.eligible_rules(ids, point_in_time).await;

        resolve_line_discounts(cart, &rules)
    }

    /// Fetch, validate, and filter the candidate discounts.
    ///
    /// Lookups run concurrently, each under its own timeout. A lookup that
    /// fails, times out, or returns a record that does not validate is logged
    /// and skipped. Surviving rules keep the order of `ids`.
    pub async fn eligible_rules(
        &self,
        ids: &[DiscountId],
        point_in_time: Timestamp,
    ) -> Vec<DiscountRule> {
        let mut lookups = JoinSet::new();

        for (index, id) in ids.iter().copied().enumerate() {
            let repository = Arc::clone(&self.repository);
            let lookup_timeout = self.lookup_timeout;

            lookups.spawn(async move {
                (
                    index,
                    id,
                    timeout(lookup_timeout, repository.get_discount(id)).await,
                )
            });
        }

        let mut fetched: Vec<(usize, RawDiscount)> = Vec::with_capacity(ids.len());

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((index, _, Ok(Ok(raw)))) => fetched.push((index, raw)),
                Ok((_, id, Ok(Err(error)))) => {
                    warn!(%id, %error, "discount lookup failed; skipping");
                }
                Ok((_, id, Err(_))) => {
                    warn!(%id, timeout = ?self.lookup_timeout, "discount lookup timed out; skipping");
                }
                Err(error) => {
                    warn!(%error, "discount lookup task failed; skipping");
                }
            }
        }

        fetched.sort_unstable_by_key(|(index, _)| *index);

        fetched
            .into_iter()
            .filter_map(|(_, raw)| {
                let id = raw.id;

                match DiscountRule::try_from(raw) {
                    Ok(rule) => Some(rule),
                    Err(error) => {
                        warn!(%id, %error, "rejected discount record; skipping");
                        None
                    }
                }
            })
            .filter(|rule| rule.is_eligible_at(point_in_time))
            .collect()
    }

    /// Like [`Self::eligible_rules`], but served from `cache` while it is
    /// fresh, refetching and storing on staleness.
    pub async fn eligible_rules_cached(
        &self,
        cache: &mut DiscountCache,
        ids: &[DiscountId],
        point_in_time: Timestamp,
    ) -> Vec<DiscountRule> {
        if let Some(rules) = cache.get(point_in_time) {
            return rules.to_vec();
        }

        let rules = self.eligible_rules(ids, point_in_time).await;

        cache.store(rules.clone(), point_in_time);

        rules
    }
}
