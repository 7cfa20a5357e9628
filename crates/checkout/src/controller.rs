//! Checkout controller.
//!
//! Owns one [`CheckoutForm`] for the lifetime of a checkout and wires it to
//! its collaborators:
//!
//! - reference data for the country, state, and card expiration dropdowns
//! - the cart service, followed through a [`CartSubscription`]
//!
//! State lists are kept per address group. Each lookup gets a sequence number
//! and only the latest lookup issued for a group may write that group's list,
//! so a slow response can never overwrite a newer one.

use std::sync::Arc;

use checkout_kit_core::{CartSummary, Country, State};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::cart::{CartService, CartSubscription, CartSummaryView};
use crate::clock::Clock;
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result, add_breadcrumb};
use crate::form::{AddressGroup, CheckoutForm, CheckoutPayload, FieldPath, FieldValue, GroupName, fields};
use crate::reference::{ReferenceData, ReferenceDataError, ReferenceSource};

// =============================================================================
// State selection policy
// =============================================================================

/// What happens to the state field when a new state list arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSelectionPolicy {
    /// Select the first state of the list (nothing when the list is empty).
    #[default]
    AutoSelectFirst,
    /// Clear the state field and let the customer choose.
    LeaveUnselected,
}

/// Error returned when a state selection policy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown state selection policy: {0} (expected `first` or `none`)")]
pub struct StateSelectionPolicyError(pub String);

impl std::str::FromStr for StateSelectionPolicy {
    type Err = StateSelectionPolicyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::AutoSelectFirst),
            "none" => Ok(Self::LeaveUnselected),
            _ => Err(StateSelectionPolicyError(s.to_string())),
        }
    }
}

// =============================================================================
// State lookups
// =============================================================================

/// An issued state lookup, to be completed with the fetched list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatesLookup {
    group: AddressGroup,
    country: Country,
    seq: u64,
}

impl StatesLookup {
    /// The address group the states are for.
    #[must_use]
    pub const fn group(&self) -> AddressGroup {
        self.group
    }

    /// The country whose states are requested.
    #[must_use]
    pub const fn country(&self) -> &Country {
        &self.country
    }

    /// Issue order; later lookups have larger numbers.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// Result of completing a state lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The list was stored for its group.
    Applied,
    /// A newer lookup was issued for the group; the list was discarded.
    Superseded,
}

/// Per address group state list.
#[derive(Debug, Default)]
struct StateSlot {
    states: Vec<State>,
    /// Sequence number of the newest lookup allowed to write `states`.
    latest: u64,
}

// =============================================================================
// CheckoutController
// =============================================================================

/// Drives one checkout: form, dropdown lists, cart totals, and submission.
pub struct CheckoutController<R: ReferenceData> {
    reference: R,
    clock: Arc<dyn Clock>,
    policy: StateSelectionPolicy,
    form: CheckoutForm,
    countries: Vec<Country>,
    shipping_states: StateSlot,
    billing_states: StateSlot,
    next_seq: u64,
    credit_card_months: Vec<u32>,
    credit_card_years: Vec<i32>,
    cart_summary: CartSummaryView,
    subscription: Option<CartSubscription>,
    copying_shipping: bool,
}

impl CheckoutController<ReferenceSource> {
    /// Build a controller over the configured reference data source.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference data source cannot be built.
    pub fn from_config(config: &CheckoutConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let reference = ReferenceSource::from_config(config, Arc::clone(&clock))?;
        let controller = Self::with_policy(reference, clock, config.state_selection);
        Ok(controller.with_cart_summary(CartSummary::empty(config.currency)))
    }
}

impl<R: ReferenceData> CheckoutController<R> {
    /// A controller with an empty form and the default state selection policy.
    pub fn new(reference: R, clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(reference, clock, StateSelectionPolicy::default())
    }

    /// A controller with an empty form and the given state selection policy.
    pub fn with_policy(reference: R, clock: Arc<dyn Clock>, policy: StateSelectionPolicy) -> Self {
        Self {
            reference,
            clock,
            policy,
            form: CheckoutForm::new(),
            countries: Vec::new(),
            shipping_states: StateSlot::default(),
            billing_states: StateSlot::default(),
            next_seq: 0,
            credit_card_months: Vec::new(),
            credit_card_years: Vec::new(),
            cart_summary: CartSummaryView::default(),
            subscription: None,
            copying_shipping: false,
        }
    }

    /// Start the cart summary from `summary` instead of an empty USD cart.
    #[must_use]
    pub fn with_cart_summary(mut self, summary: CartSummary) -> Self {
        self.cart_summary = CartSummaryView::new(summary);
        self
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Subscribe to cart totals and load the reference lists.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// See [`load_reference_data`](Self::load_reference_data). The cart
    /// subscription is in place even when a lookup fails.
    #[instrument(skip_all)]
    pub async fn init(&mut self, cart: &CartService) -> Result<()> {
        self.subscription = Some(CartSubscription::spawn(cart, self.cart_summary.clone()));
        add_breadcrumb("checkout", "Checkout started", None);
        self.load_reference_data().await
    }

    /// Load card months (from the current month), card years, and countries.
    ///
    /// Every lookup runs even when an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first failure. The list of each failed lookup is left
    /// empty; calling this again retries.
    #[instrument(skip_all)]
    pub async fn load_reference_data(&mut self) -> Result<()> {
        let mut first_error: Option<ReferenceDataError> = None;

        let start_month = self.clock.current_month();
        self.credit_card_months = keep_or_log(
            self.reference.credit_card_months(start_month).await,
            "credit card months",
            &mut first_error,
        );
        self.credit_card_years = keep_or_log(
            self.reference.credit_card_years().await,
            "credit card years",
            &mut first_error,
        );
        self.countries = keep_or_log(
            self.reference.countries().await,
            "countries",
            &mut first_error,
        );

        debug!(
            months = self.credit_card_months.len(),
            years = self.credit_card_years.len(),
            countries = self.countries.len(),
            "Reference data loaded"
        );

        first_error.map_or(Ok(()), |e| Err(e.into()))
    }

    // =========================================================================
    // Countries and states
    // =========================================================================

    /// Issue a state lookup for the country selected in `group`.
    ///
    /// Any lookup issued earlier for the same group is superseded.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoCountrySelected`] if the group's country
    /// field is empty.
    pub fn begin_states_lookup(&mut self, group: AddressGroup) -> Result<StatesLookup> {
        let country = self
            .form
            .value(&group.path(fields::COUNTRY))
            .as_country()
            .cloned()
            .ok_or(CheckoutError::NoCountrySelected {
                group: group.group_name(),
            })?;

        let seq = self.bump_seq(group);
        Ok(StatesLookup {
            group,
            country,
            seq,
        })
    }

    /// Store the states fetched for `lookup` and apply the selection policy.
    ///
    /// # Errors
    ///
    /// Returns a form error if the state field rejects the selection, which
    /// cannot happen with the standard layout.
    pub fn complete_states_lookup(
        &mut self,
        lookup: &StatesLookup,
        states: Vec<State>,
    ) -> Result<LookupOutcome> {
        if self.slot(lookup.group).latest != lookup.seq {
            debug!(
                group = %lookup.group,
                seq = lookup.seq,
                "Discarding superseded state list"
            );
            return Ok(LookupOutcome::Superseded);
        }

        let selection = match self.policy {
            StateSelectionPolicy::AutoSelectFirst => FieldValue::from(states.first().cloned()),
            StateSelectionPolicy::LeaveUnselected => FieldValue::Empty,
        };
        self.slot_mut(lookup.group).states = states;
        self.form
            .set_value(&lookup.group.path(fields::STATE), selection)?;

        Ok(LookupOutcome::Applied)
    }

    /// Fetch and store the states for the country selected in `group`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoCountrySelected`] if no country is
    /// selected, or the lookup failure. A failed lookup that is still the
    /// latest for its group leaves that group's list empty.
    #[instrument(skip_all, fields(group = %group))]
    pub async fn get_states(&mut self, group: AddressGroup) -> Result<LookupOutcome> {
        let lookup = self.begin_states_lookup(group)?;

        match self.reference.states(&lookup.country.code).await {
            Ok(states) => self.complete_states_lookup(&lookup, states),
            Err(e) => {
                warn!(error = %e, country = %lookup.country.code, "Failed to load states");
                if self.slot(group).latest == lookup.seq {
                    self.slot_mut(group).states.clear();
                }
                Err(e.into())
            }
        }
    }

    /// Select a country for an address group and load its states.
    ///
    /// # Errors
    ///
    /// Returns the state lookup failure; the country stays selected.
    #[instrument(skip_all, fields(group = %group, country = %country.code))]
    pub async fn select_country(
        &mut self,
        group: AddressGroup,
        country: Country,
    ) -> Result<LookupOutcome> {
        add_breadcrumb(
            "checkout",
            "Country selected",
            Some(&[("group", group.group_name().as_str()), ("country", country.code.as_str())]),
        );
        self.form.set_value(&group.path(fields::COUNTRY), country)?;
        self.get_states(group).await
    }

    // =========================================================================
    // Card expiration
    // =========================================================================

    /// Reload the month list for the selected expiration year.
    ///
    /// The list starts at the current month when the current year is
    /// selected, and at January otherwise.
    ///
    /// # Errors
    ///
    /// Returns the lookup failure; the previous month list is kept.
    #[instrument(skip(self))]
    pub async fn refresh_expiration_months(&mut self) -> Result<()> {
        let selected_year = self.form.value(&expiration_year_path()?).as_number();
        let start_month = if selected_year == Some(self.clock.current_year()) {
            self.clock.current_month()
        } else {
            1
        };

        self.credit_card_months = self.reference.credit_card_months(start_month).await?;
        debug!(start_month, "Expiration months refreshed");
        Ok(())
    }

    /// Select an expiration year and reload the month list.
    ///
    /// # Errors
    ///
    /// Returns the month lookup failure; the year stays selected.
    pub async fn select_expiration_year(&mut self, year: i32) -> Result<()> {
        self.form.set_value(&expiration_year_path()?, year)?;
        self.refresh_expiration_months().await
    }

    // =========================================================================
    // Billing address copy
    // =========================================================================

    /// Copy the shipping address into billing, or clear billing.
    ///
    /// Enabling copies every shipping field and the shipping state list.
    /// Disabling resets the billing group and empties its state list. Either
    /// way, billing state lookups still in flight are superseded.
    ///
    /// # Errors
    ///
    /// Returns a form error if the billing group rejects the copy, which
    /// cannot happen with the standard layout.
    #[instrument(skip(self))]
    pub fn copy_shipping_to_billing(&mut self, enabled: bool) -> Result<()> {
        self.bump_seq(AddressGroup::Billing);

        if enabled {
            let values = self.form.group_value(GroupName::ShippingAddress);
            self.form
                .set_group_value(GroupName::BillingAddress, values)?;
            self.billing_states.states = self.shipping_states.states.clone();
        } else {
            self.form.reset_group(GroupName::BillingAddress);
            self.billing_states.states.clear();
        }

        self.copying_shipping = enabled;
        Ok(())
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate and hand off the checkout.
    ///
    /// On success the payload is logged (card data masked), returned, and the
    /// form starts over empty.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidForm`] listing the invalid fields when
    /// the form is not valid. Every control is marked as touched so errors
    /// are displayed, and nothing is logged as submitted.
    #[instrument(skip(self))]
    pub fn submit(&mut self) -> Result<CheckoutPayload> {
        if !self.form.is_valid() {
            self.form.mark_all_as_touched();
            let fields = self.form.invalid_fields();
            info!(invalid = fields.len(), "Checkout submit rejected");
            return Err(CheckoutError::InvalidForm { fields });
        }

        let payload = CheckoutPayload::from_form(&self.form, self.cart_summary.get())?;
        match serde_json::to_string(&payload) {
            Ok(json) => info!(
                submission_id = %payload.submission_id,
                payload = %json,
                "Checkout submitted"
            ),
            Err(e) => warn!(
                submission_id = %payload.submission_id,
                error = %e,
                "Checkout submitted, payload could not be serialized for logging"
            ),
        }
        let submission_id = payload.submission_id.to_string();
        add_breadcrumb(
            "checkout",
            "Checkout submitted",
            Some(&[("submission_id", submission_id.as_str())]),
        );

        self.form = CheckoutForm::new();
        for group in [AddressGroup::Shipping, AddressGroup::Billing] {
            self.bump_seq(group);
            self.slot_mut(group).states.clear();
        }
        self.copying_shipping = false;
        Ok(payload)
    }

    /// Stop following the cart.
    pub fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            debug!("Cart subscription released");
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Mutable access for typing into fields.
    pub const fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    #[must_use]
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// States loaded for an address group.
    #[must_use]
    pub fn states(&self, group: AddressGroup) -> &[State] {
        &self.slot(group).states
    }

    #[must_use]
    pub fn credit_card_months(&self) -> &[u32] {
        &self.credit_card_months
    }

    #[must_use]
    pub fn credit_card_years(&self) -> &[i32] {
        &self.credit_card_years
    }

    /// Cached cart totals.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        self.cart_summary.get()
    }

    /// Whether billing was last set from shipping.
    #[must_use]
    pub const fn is_copying_shipping(&self) -> bool {
        self.copying_shipping
    }

    #[must_use]
    pub const fn state_selection(&self) -> StateSelectionPolicy {
        self.policy
    }

    /// Whether the cart subscription is active.
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    #[must_use]
    pub const fn reference(&self) -> &R {
        &self.reference
    }

    const fn slot(&self, group: AddressGroup) -> &StateSlot {
        match group {
            AddressGroup::Shipping => &self.shipping_states,
            AddressGroup::Billing => &self.billing_states,
        }
    }

    const fn slot_mut(&mut self, group: AddressGroup) -> &mut StateSlot {
        match group {
            AddressGroup::Shipping => &mut self.shipping_states,
            AddressGroup::Billing => &mut self.billing_states,
        }
    }

    fn bump_seq(&mut self, group: AddressGroup) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.slot_mut(group).latest = seq;
        seq
    }
}

impl<R: ReferenceData> Drop for CheckoutController<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn expiration_year_path() -> Result<FieldPath> {
    Ok(FieldPath::new(GroupName::CreditCard, fields::EXPIRATION_YEAR)?)
}

/// Keep a lookup result, or log it and remember the first failure.
fn keep_or_log<T>(
    result: std::result::Result<Vec<T>, ReferenceDataError>,
    what: &str,
    first_error: &mut Option<ReferenceDataError>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Failed to load {what}");
            first_error.get_or_insert(e);
            Vec::new()
        }
    }
}
