//! The cart state machine.

use shopfront_core::{Cart, CurrencyCode, Price, Product, ProductId};
use tracing::{info, instrument, warn};

use super::backend::CartBackend;
use super::local::LocalCart;
use super::remote::RemoteCart;
use crate::api::ApiClient;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::session::Session;

/// Which backend currently owns the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartMode {
    /// Lines live in the local mirror.
    Anonymous,
    /// Lines live on the server.
    Authenticated,
}

/// Outcome of [`CartEngine::merge_carts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Lines found in the anonymous mirror.
    pub lines: usize,
    /// Units the server accepted.
    pub units_merged: u32,
    /// Units the server rejected.
    pub units_failed: u32,
    /// Units never sent because the session ended mid-merge.
    pub units_skipped: u32,
    /// Whether the mirror was deleted.
    pub mirror_discarded: bool,
}

impl MergeReport {
    /// Every unit from the mirror reached the server.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.units_failed == 0 && self.units_skipped == 0
    }
}

/// Keeps the displayed cart consistent with whichever backend owns it.
///
/// The backend is chosen from the session on every call. After every
/// mutation the whole cart is refetched from that backend and replaces the
/// in-memory lines, so the count and total always describe what the backend
/// holds. When a mutation fails the refetch still runs and the mutation's
/// error is returned.
#[derive(Debug)]
pub struct CartEngine {
    session: Session,
    local: LocalCart,
    remote: RemoteCart,
    cart: Cart,
    currency: CurrencyCode,
}

impl CartEngine {
    /// An engine with an empty in-memory cart; call [`refresh`](Self::refresh)
    /// to load the current contents.
    #[must_use]
    pub fn new(api: ApiClient, currency: CurrencyCode) -> Self {
        let session = api.session().clone();
        Self {
            local: LocalCart::new(session.store().clone()),
            remote: RemoteCart::new(api),
            session,
            cart: Cart::new(),
            currency,
        }
    }

    #[must_use]
    pub fn mode(&self) -> CartMode {
        if self.session.is_authenticated() {
            CartMode::Authenticated
        } else {
            CartMode::Anonymous
        }
    }

    fn backend(&self) -> &dyn CartBackend {
        match self.mode() {
            CartMode::Anonymous => &self.local,
            CartMode::Authenticated => &self.remote,
        }
    }

    /// The lines as of the last refresh.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Total units, the number shown on the cart badge.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.cart.item_count()
    }

    /// Sum of `unit_price * quantity` over the lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total(self.currency)
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Reload the cart from the active backend.
    ///
    /// On failure the previous lines are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read. A server cart that
    /// does not exist is an empty cart, not an error.
    #[instrument(skip(self), fields(mode = ?self.mode()))]
    pub async fn refresh(&mut self) -> Result<&Cart> {
        self.cart = self.backend().fetch().await?;
        Ok(&self.cart)
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns the mutation's error, or the refresh error if only the
    /// refresh failed.
    #[instrument(skip(self, product), fields(product_id = %product.id, mode = ?self.mode()))]
    pub async fn add(&mut self, product: &Product) -> Result<()> {
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product.id.to_string().as_str())]),
        );
        let result = self.backend().add(product).await;
        self.settle(result).await
    }

    /// Remove one unit of `product_id`.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    #[instrument(skip(self), fields(product_id = %product_id, mode = ?self.mode()))]
    pub async fn decrease(&mut self, product_id: ProductId) -> Result<()> {
        add_breadcrumb(
            "cart",
            "Decreased quantity",
            Some(&[("product_id", product_id.to_string().as_str())]),
        );
        let result = self.backend().decrease(product_id).await;
        self.settle(result).await
    }

    /// Remove the whole line for `product_id`.
    ///
    /// On the server this is one `remove` call per unit; a failure part way
    /// leaves the units already removed gone.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    #[instrument(skip(self), fields(product_id = %product_id, mode = ?self.mode()))]
    pub async fn remove_line(&mut self, product_id: ProductId) -> Result<()> {
        let quantity = self.cart.quantity_of(product_id);
        add_breadcrumb(
            "cart",
            "Removed line",
            Some(&[
                ("product_id", product_id.to_string().as_str()),
                ("quantity", quantity.to_string().as_str()),
            ]),
        );
        let result = self.backend().remove_line(product_id, quantity).await;
        self.settle(result).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    #[instrument(skip(self), fields(mode = ?self.mode()))]
    pub async fn clear(&mut self) -> Result<()> {
        add_breadcrumb("cart", "Cleared cart", None);
        let snapshot = self.cart.clone();
        let result = self.backend().clear(&snapshot).await;
        self.settle(result).await
    }

    /// Refetch after a mutation and report the first error.
    async fn settle(&mut self, mutation: Result<()>) -> Result<()> {
        let refreshed = self.refresh().await.map(|_| ());
        match (mutation, refreshed) {
            (Err(e), Err(refresh_err)) => {
                warn!(error = %refresh_err, "Cart refresh after failed mutation also failed");
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    /// Move the anonymous mirror into the server cart.
    ///
    /// Call once, right after a successful sign-in. Each unit in the mirror
    /// becomes one `add` call, sent in order. Rejected units are logged and
    /// counted, never retried. If the session ends part way the remaining
    /// units are skipped. The mirror is deleted afterwards whatever happened,
    /// then the server cart is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when the session is anonymous.
    /// Server and storage failures during the merge are reported in the
    /// returned [`MergeReport`] instead.
    #[instrument(skip(self))]
    pub async fn merge_carts(&mut self) -> Result<MergeReport> {
        if !self.session.is_authenticated() {
            return Err(AppError::SignInRequired);
        }

        let mirror = self.local.load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read cart mirror, nothing to merge");
            Cart::new()
        });

        let mut report = MergeReport {
            lines: mirror.lines().len(),
            ..MergeReport::default()
        };

        for line in mirror.lines() {
            for _ in 0..line.quantity {
                if !self.session.is_authenticated() {
                    report.units_skipped += 1;
                    continue;
                }
                match self.remote.add(&line.product).await {
                    Ok(()) => report.units_merged += 1,
                    Err(e) => {
                        warn!(
                            product_id = %line.product_id,
                            error = %e,
                            "Failed to merge cart unit"
                        );
                        report.units_failed += 1;
                    }
                }
            }
        }

        match self.local.discard() {
            Ok(()) => report.mirror_discarded = true,
            Err(e) => warn!(error = %e, "Failed to delete cart mirror after merge"),
        }

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Cart refresh after merge failed");
        }

        info!(
            lines = report.lines,
            merged = report.units_merged,
            failed = report.units_failed,
            skipped = report.units_skipped,
            "Cart merged"
        );
        Ok(report)
    }

    /// Sign out: drop the credential and empty the displayed cart.
    ///
    /// An anonymous mirror left from before sign-in is not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored tokens cannot be removed. The session
    /// is anonymous and the cart empty regardless.
    #[instrument(skip(self))]
    pub fn logout(&mut self) -> Result<()> {
        self.cart = Cart::new();
        self.session.clear()?;
        info!("Signed out");
        Ok(())
    }
}
