//! Cart totals feed for the checkout page.
//!
//! The cart service owns the running totals and publishes every change on
//! `tokio::sync::watch` channels. Checkout keeps a read-only cached copy in a
//! [`CartSummaryView`], kept current by a [`CartSubscription`] task.

use std::sync::{Arc, RwLock};

use checkout_kit_core::{CartSummary, CurrencyCode, Price};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Publisher of cart totals.
#[derive(Debug)]
pub struct CartService {
    total_price: watch::Sender<Price>,
    total_quantity: watch::Sender<u32>,
}

impl CartService {
    /// An empty cart in the given currency.
    #[must_use]
    pub fn new(currency_code: CurrencyCode) -> Self {
        let (total_price, _) = watch::channel(Price::zero(currency_code));
        let (total_quantity, _) = watch::channel(0);
        Self {
            total_price,
            total_quantity,
        }
    }

    /// Publish new totals to every subscriber.
    pub fn publish(&self, total_price: Price, total_quantity: u32) {
        self.total_price.send_replace(total_price);
        self.total_quantity.send_replace(total_quantity);
    }

    /// Stream of total price values.
    #[must_use]
    pub fn total_price(&self) -> watch::Receiver<Price> {
        self.total_price.subscribe()
    }

    /// Stream of total quantity values.
    #[must_use]
    pub fn total_quantity(&self) -> watch::Receiver<u32> {
        self.total_quantity.subscribe()
    }

    /// The totals as of now.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            total_price: *self.total_price.borrow(),
            total_quantity: *self.total_quantity.borrow(),
        }
    }
}

/// Shared, cached copy of the cart totals.
#[derive(Debug, Clone, Default)]
pub struct CartSummaryView {
    inner: Arc<RwLock<CartSummary>>,
}

impl CartSummaryView {
    #[must_use]
    pub fn new(summary: CartSummary) -> Self {
        Self {
            inner: Arc::new(RwLock::new(summary)),
        }
    }

    /// Current cached totals.
    #[must_use]
    pub fn get(&self) -> CartSummary {
        // CartSummary is Copy, so a poisoned lock still holds a whole value
        self.inner
            .read()
            .map_or_else(|poisoned| *poisoned.into_inner(), |guard| *guard)
    }

    fn update(&self, f: impl FnOnce(&mut CartSummary)) {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

/// Background task copying cart totals into a [`CartSummaryView`].
///
/// The task is aborted when the subscription is released or dropped, and
/// ends on its own once the cart service goes away.
#[derive(Debug)]
pub struct CartSubscription {
    handle: JoinHandle<()>,
}

impl CartSubscription {
    /// Seed `view` with the current totals and follow every later change.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(cart: &CartService, view: CartSummaryView) -> Self {
        let mut price_rx = cart.total_price();
        let mut quantity_rx = cart.total_quantity();

        let total_price = *price_rx.borrow_and_update();
        let total_quantity = *quantity_rx.borrow_and_update();
        view.update(|summary| {
            summary.total_price = total_price;
            summary.total_quantity = total_quantity;
        });

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = price_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let price = *price_rx.borrow_and_update();
                        view.update(|summary| summary.total_price = price);
                    }
                    changed = quantity_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let quantity = *quantity_rx.borrow_and_update();
                        view.update(|summary| summary.total_quantity = quantity);
                    }
                }
            }
            debug!("Cart service closed, subscription finished");
        });

        Self { handle }
    }

    /// Stop following the cart.
    pub fn unsubscribe(self) {
        // Drop aborts the task
    }

    /// Whether the task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CartSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
