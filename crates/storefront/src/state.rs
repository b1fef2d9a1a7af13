//! The storefront facade: one session shared by every engine.

use std::sync::Arc;

use shopfront_core::{OrderId, ProductId};
use tracing::{info, instrument, warn};

use crate::accounts::{Credentials, RegistrationForm};
use crate::api::{ApiClient, ApiError, PaymentConfirmation, PaymentSession};
use crate::cart::{CartEngine, MergeReport};
use crate::catalog::Catalog;
use crate::checkout::{Checkout, CheckoutOutcome, PaymentGateway, ShippingAddress};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::orders::{Order, OrderHistory};
use crate::session::Session;
use crate::storage::{FileStore, LocalStore};
use crate::wishlist::WishlistStore;

/// Everything a storefront front end talks to.
///
/// Built once at startup. The session is loaded from the local store and
/// the same handle is given to the API client and every engine, so a
/// sign-in or a forced sign-out is seen everywhere at once.
#[derive(Debug)]
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartEngine,
    wishlist: WishlistStore,
    catalog: Catalog,
    orders: OrderHistory,
    checkout: Checkout,
}

impl Storefront {
    /// Open the file store under `config.state_dir` and restore the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory or the stored session cannot
    /// be read, or the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let store = FileStore::open(&config.state_dir)?;
        Self::with_store(config, Arc::new(store))
    }

    /// Build over an existing store.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn LocalStore>) -> Result<Self> {
        let session = Session::load(store)?;
        let api = ApiClient::new(&config.api, session)?;

        Ok(Self {
            cart: CartEngine::new(api.clone(), config.currency),
            wishlist: WishlistStore::new(api.clone()),
            catalog: Catalog::new(api.clone()),
            orders: OrderHistory::new(api.clone()),
            checkout: Checkout::new(api.clone()),
            api,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.api.session()
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &CartEngine {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartEngine {
        &mut self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub const fn wishlist_mut(&mut self) -> &mut WishlistStore {
        &mut self.wishlist
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Load the cart and, when signed in, the wishlist.
    ///
    /// # Errors
    ///
    /// Returns the cart error. A wishlist failure is logged only.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<()> {
        self.cart.refresh().await?;
        if let Err(e) = self.wishlist.fetch().await {
            warn!(error = %e, "Wishlist refresh failed");
        }
        Ok(())
    }

    /// Sign in, merge the anonymous cart into the server cart and load the
    /// wishlist.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for blank fields, before any request
    /// - [`AppError::InvalidCredentials`] when the server rejects them
    /// - the API or storage error if the sign-in itself fails
    ///
    /// Merge and wishlist failures do not fail the sign-in.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<MergeReport> {
        credentials.validate().map_err(AppError::Validation)?;

        let credential = self
            .api
            .obtain_token(credentials.username.trim(), &credentials.password)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized => AppError::InvalidCredentials,
                other => AppError::Api(other),
            })?;

        self.session().establish(credential)?;
        set_sentry_user(credentials.username.trim());
        info!("Signed in");

        let report = self.cart.merge_carts().await?;
        if let Err(e) = self.wishlist.fetch().await {
            warn!(error = %e, "Wishlist fetch after sign-in failed");
        }
        Ok(report)
    }

    /// Sign out and forget the server-backed state.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored tokens cannot be removed.
    #[instrument(skip(self))]
    pub fn sign_out(&mut self) -> Result<()> {
        self.wishlist.clear();
        clear_sentry_user();
        self.cart.logout()
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with local or server field errors.
    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<()> {
        let valid = form.validate().map_err(AppError::Validation)?;
        self.api
            .register(&valid.as_new_account())
            .await
            .map_err(|e| match e {
                ApiError::BadRequest(errors) => AppError::Validation(errors),
                other => AppError::Api(other),
            })?;
        info!("Account created");
        Ok(())
    }

    /// Fetch `product_id` from the catalog and add one unit to the cart.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown product, otherwise the cart
    /// error.
    pub async fn add_to_cart(&mut self, product_id: ProductId) -> Result<()> {
        let product = self.catalog.product(product_id).await?;
        self.cart.add(&product).await
    }

    /// Add `product_id` to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when anonymous.
    pub async fn add_to_wishlist(&mut self, product_id: ProductId) -> Result<()> {
        self.wishlist.add_id(product_id).await
    }

    /// Completed orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when anonymous.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.orders.fetch().await
    }

    /// Open a payment for the current cart.
    ///
    /// # Errors
    ///
    /// See [`Checkout::start`].
    pub async fn start_checkout(&mut self, address: &ShippingAddress) -> Result<PaymentSession> {
        self.cart.refresh().await?;
        self.checkout.start(&self.cart, address).await
    }

    /// Finish a checkout whose payment was collected elsewhere.
    ///
    /// # Errors
    ///
    /// See [`Checkout::confirm`].
    pub async fn confirm_checkout(
        &mut self,
        confirmation: &PaymentConfirmation,
        address: &ShippingAddress,
    ) -> Result<OrderId> {
        self.checkout
            .confirm(&mut self.cart, confirmation, address)
            .await
    }

    /// Validate, pay through `gateway`, and place the order.
    ///
    /// # Errors
    ///
    /// See [`Checkout::run`].
    pub async fn place_order(
        &mut self,
        address: &ShippingAddress,
        gateway: &dyn PaymentGateway,
    ) -> Result<CheckoutOutcome> {
        self.checkout.run(&mut self.cart, address, gateway).await
    }
}
