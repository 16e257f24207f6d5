//! The checkout wizard.

use std::sync::Arc;

use cart::{CartEngine, CartRemote, KeyValueStore};
use common::{CustomerId, Money, Notifier, TracingNotifier, TransactionId};
use payment::{
    GatewayHandle, OutcomeDecider, PaymentDetails, PaymentFees, PaymentGateway, PaymentOutcome,
};

use crate::address::{Address, AddressBook, AddressId, NewAddress};
use crate::delivery::{DeliveryOption, DeliveryPricing};
use crate::error::{CheckoutError, Result};
use crate::order::{Order, OrderRequest, OrderSummary, PlacedOrder};
use crate::services::OrderService;
use crate::step::CheckoutStep;

/// One checkout run over a shared cart.
///
/// Moves strictly forward through [`CheckoutStep`]s and back only to steps
/// already visited. The order is frozen on entering payment; later cart
/// changes do not reach it. Only outcomes from the gateway opened by
/// [`open_payment`](Self::open_payment) are accepted. If payment succeeds
/// but the order cannot be created, the session ends and every further
/// command fails with [`CheckoutError::SessionTerminated`].
pub struct CheckoutSession<R, S, O>
where
    R: CartRemote,
    S: KeyValueStore,
    O: OrderService,
{
    cart: Arc<CartEngine<R, S>>,
    orders: O,
    address_book: AddressBook,
    pricing: DeliveryPricing,
    fees: PaymentFees,
    notifier: Arc<dyn Notifier>,
    customer_id: Option<CustomerId>,
    step: CheckoutStep,
    selected_address: Option<AddressId>,
    delivery: Option<DeliveryOption>,
    order: Option<Order>,
    payment: Option<OpenPayment>,
    placed: Option<PlacedOrder>,
    terminated: bool,
}

impl<R, S, O> CheckoutSession<R, S, O>
where
    R: CartRemote,
    S: KeyValueStore,
    O: OrderService,
{
    /// Starts checkout on the address step with the first saved address and
    /// standard delivery preselected.
    pub async fn start(
        cart: Arc<CartEngine<R, S>>,
        orders: O,
        address_book: AddressBook,
        pricing: DeliveryPricing,
    ) -> Result<Self> {
        if cart.state().await.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let selected_address = address_book.first().map(|a| a.id);
        tracing::info!(saved_addresses = address_book.len(), "checkout started");

        Ok(Self {
            cart,
            orders,
            address_book,
            pricing,
            fees: PaymentFees::default(),
            notifier: Arc::new(TracingNotifier),
            customer_id: None,
            step: CheckoutStep::Address,
            selected_address,
            delivery: Some(DeliveryOption::Standard),
            order: None,
            payment: None,
            placed: None,
            terminated: false,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the method surcharges applied by gateways this session opens.
    pub fn with_payment_fees(mut self, fees: PaymentFees) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    // Query methods

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn address_book(&self) -> &AddressBook {
        &self.address_book
    }

    pub fn selected_address(&self) -> Option<&Address> {
        self.selected_address
            .and_then(|id| self.address_book.get(id))
    }

    pub fn delivery_option(&self) -> Option<DeliveryOption> {
        self.delivery
    }

    pub fn pricing(&self) -> &DeliveryPricing {
        &self.pricing
    }

    /// Returns the frozen order, once prepared.
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn placed_order(&self) -> Option<&PlacedOrder> {
        self.placed.as_ref()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Returns the totals the order would have if prepared now.
    pub async fn preview_summary(&self) -> OrderSummary {
        let cart = self.cart.summary().await;
        let shipping = self
            .delivery
            .map(|option| self.pricing.cost(option, cart.subtotal))
            .unwrap_or_else(Money::zero);
        OrderSummary::new(cart.subtotal, shipping, cart.discount)
    }

    // Command methods

    /// Validates an address form; a valid address joins the book and
    /// becomes the selected one.
    #[tracing::instrument(skip(self, form))]
    pub fn add_address(&mut self, form: NewAddress) -> Result<AddressId> {
        self.ensure_active()?;
        self.ensure_step(CheckoutStep::Address, "add an address")?;

        let address = form
            .into_address()
            .map_err(|errors| self.reject(CheckoutError::InvalidAddress(errors)))?;
        let id = address.id;
        self.address_book.push(address);
        self.selected_address = Some(id);

        tracing::debug!(%id, "address added");
        self.notifier.success("Address added");
        Ok(id)
    }

    pub fn select_address(&mut self, id: AddressId) -> Result<()> {
        self.ensure_active()?;
        self.ensure_step(CheckoutStep::Address, "select an address")?;
        if self.address_book.get(id).is_none() {
            return Err(self.reject(CheckoutError::UnknownAddress(id)));
        }
        self.selected_address = Some(id);
        Ok(())
    }

    /// Chooses a delivery option. Allowed until the order is frozen.
    pub fn select_delivery(&mut self, option: DeliveryOption) -> Result<()> {
        self.ensure_active()?;
        self.ensure_before_payment("select delivery")?;
        self.delivery = Some(option);
        Ok(())
    }

    /// Drops the delivery choice.
    pub fn clear_delivery(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.ensure_before_payment("clear delivery")?;
        self.delivery = None;
        Ok(())
    }

    /// Moves to the next step if its gate is satisfied.
    ///
    /// Confirmation is never reached this way; see
    /// [`record_payment`](Self::record_payment).
    #[tracing::instrument(skip(self), fields(step = %self.step))]
    pub fn advance(&mut self) -> Result<CheckoutStep> {
        self.ensure_active()?;
        let next = match self.step.next() {
            Some(next) => next,
            None => {
                return Err(self.reject(CheckoutError::InvalidStep {
                    operation: "advance",
                    step: self.step,
                }));
            }
        };

        match self.step {
            CheckoutStep::Address if self.selected_address().is_none() => {
                return Err(self.reject(CheckoutError::NoAddressSelected));
            }
            CheckoutStep::Delivery if self.delivery.is_none() => {
                return Err(self.reject(CheckoutError::NoDeliverySelected));
            }
            _ => {}
        }

        self.step = next;
        tracing::debug!(%next, "checkout advanced");
        Ok(next)
    }

    /// Returns to the previous step.
    pub fn back(&mut self) -> Result<CheckoutStep> {
        self.ensure_active()?;
        match self.step.previous() {
            Some(previous) => {
                self.leave_to(previous);
                Ok(previous)
            }
            None => Err(self.reject(CheckoutError::InvalidStep {
                operation: "go back",
                step: self.step,
            })),
        }
    }

    /// Jumps back to an earlier step.
    pub fn go_to(&mut self, step: CheckoutStep) -> Result<()> {
        self.ensure_active()?;
        if step >= self.step || self.step.is_terminal() {
            return Err(self.reject(CheckoutError::InvalidStep {
                operation: "jump to that step",
                step: self.step,
            }));
        }
        self.leave_to(step);
        Ok(())
    }

    /// Freezes the order from the current cart, address and delivery choice.
    ///
    /// Once frozen the order is returned unchanged until the session leaves
    /// the payment step.
    #[tracing::instrument(skip(self))]
    pub async fn prepare_order(&mut self) -> Result<&Order> {
        self.ensure_active()?;
        self.ensure_step(CheckoutStep::Payment, "prepare the order")?;

        let order = match self.order.take() {
            Some(frozen) => frozen,
            None => self.assemble_order().await?,
        };
        Ok(&*self.order.insert(order))
    }

    /// Opens a payment gateway for the frozen order total, preparing the
    /// order first if needed.
    pub async fn open_payment<D: OutcomeDecider>(
        &mut self,
        decider: D,
    ) -> Result<(PaymentGateway<D>, GatewayHandle)> {
        self.ensure_active()?;
        self.ensure_step(CheckoutStep::Payment, "open payment")?;

        let total = match self.order.as_ref().map(|o| o.summary.total) {
            Some(total) => total,
            None => self.prepare_order().await?.summary.total,
        };

        if let Some(previous) = self.payment.take() {
            previous.handle.close();
        }
        let (gateway, handle) = PaymentGateway::open(total, decider);
        let gateway = gateway.with_fees(self.fees.clone());
        self.payment = Some(OpenPayment {
            handle: handle.clone(),
            transaction_id: gateway.transaction_id().clone(),
        });
        Ok((gateway, handle))
    }

    /// Submits details to an open gateway and records the outcome.
    pub async fn pay<D: OutcomeDecider>(
        &mut self,
        gateway: &mut PaymentGateway<D>,
        details: PaymentDetails,
    ) -> Result<PlacedOrder> {
        self.ensure_active()?;
        self.ensure_step(CheckoutStep::Payment, "pay")?;
        let outcome = gateway.submit(details).await?;
        self.record_payment(outcome).await
    }

    /// Acts on a payment outcome.
    ///
    /// The outcome must carry the transaction ID of the open gateway, and a
    /// success must charge the frozen total plus the method fee. A decline
    /// keeps the session on the payment step. A success creates the order;
    /// the cart is cleared only once the order exists.
    #[tracing::instrument(skip(self, outcome), fields(transaction_id = %outcome.transaction_id()))]
    pub async fn record_payment(&mut self, outcome: PaymentOutcome) -> Result<PlacedOrder> {
        self.ensure_active()?;
        self.ensure_step(CheckoutStep::Payment, "record a payment")?;
        let Some(order) = self.order.clone() else {
            return Err(self.reject(CheckoutError::InvalidStep {
                operation: "record a payment before the order is prepared",
                step: self.step,
            }));
        };

        let opened = self.payment.as_ref().map(|p| &p.transaction_id);
        if opened != Some(outcome.transaction_id()) {
            return Err(self.reject(CheckoutError::UnknownPayment(
                outcome.transaction_id().clone(),
            )));
        }

        let attempt = match outcome {
            PaymentOutcome::Succeeded(attempt) => attempt,
            PaymentOutcome::Failed(failure) => {
                tracing::info!(reason = %failure.reason, "payment failed, awaiting retry");
                self.notifier.error("Payment failed. Please try again.");
                return Err(CheckoutError::PaymentFailed(failure));
            }
        };

        let expected = order.summary.total + self.fees.fee_for(attempt.method);
        if attempt.amount != expected {
            return Err(self.reject(CheckoutError::PaymentAmountMismatch {
                expected,
                charged: attempt.amount,
            }));
        }

        let request = OrderRequest::confirmed(order.clone(), attempt.clone());
        let order_id = match self.orders.create_order(&request).await {
            Ok(order_id) => order_id,
            Err(e) => {
                self.terminated = true;
                self.payment = None;
                metrics::counter!("order_creation_failures_total").increment(1);
                tracing::error!(
                    error = %e,
                    amount = %attempt.amount,
                    "order creation failed after successful payment"
                );
                self.notifier
                    .error("Payment received but the order could not be placed. Please contact support.");
                return Err(CheckoutError::OrderCreation {
                    payment: attempt,
                    reason: e.to_string(),
                });
            }
        };

        if let Err(e) = self.cart.clear().await {
            tracing::warn!(error = %e, "failed to clear cart after order");
        }

        self.step = CheckoutStep::Confirmation;
        self.payment = None;
        metrics::counter!("orders_placed_total", "method" => attempt.method.as_str()).increment(1);
        tracing::info!(%order_id, total = %order.summary.total, "order placed");
        self.notifier.success("Order placed successfully!");

        let placed = PlacedOrder {
            order_id,
            order,
            payment: attempt,
        };
        self.placed = Some(placed.clone());
        Ok(placed)
    }

    // Internals

    async fn assemble_order(&self) -> Result<Order> {
        let address = self
            .selected_address()
            .cloned()
            .ok_or(CheckoutError::NoAddressSelected)?;
        let option = self.delivery.ok_or(CheckoutError::NoDeliverySelected)?;

        let state = self.cart.state().await;
        if state.is_empty() {
            return Err(self.reject(CheckoutError::EmptyCart));
        }

        let order = Order::assemble(
            state.items(),
            &state.summary(),
            address,
            option,
            &self.pricing,
            self.customer_id,
        );
        tracing::info!(
            lines = order.lines.len(),
            total = %order.summary.total,
            delivery = %option,
            "order prepared"
        );
        Ok(order)
    }

    fn leave_to(&mut self, step: CheckoutStep) {
        if self.step == CheckoutStep::Payment {
            self.order = None;
            if let Some(open) = self.payment.take() {
                open.handle.close();
            }
        }
        self.step = step;
    }

    fn ensure_active(&self) -> Result<()> {
        if self.terminated {
            return Err(CheckoutError::SessionTerminated);
        }
        Ok(())
    }

    fn ensure_step(&self, expected: CheckoutStep, operation: &'static str) -> Result<()> {
        if self.step != expected {
            return Err(self.reject(CheckoutError::InvalidStep {
                operation,
                step: self.step,
            }));
        }
        Ok(())
    }

    fn ensure_before_payment(&self, operation: &'static str) -> Result<()> {
        if self.step >= CheckoutStep::Payment {
            return Err(self.reject(CheckoutError::InvalidStep {
                operation,
                step: self.step,
            }));
        }
        Ok(())
    }

    fn reject(&self, error: CheckoutError) -> CheckoutError {
        tracing::debug!(error = %error, step = %self.step, "checkout command rejected");
        self.notifier.error(&error.to_string());
        error
    }
}

impl<R, S, O> Drop for CheckoutSession<R, S, O>
where
    R: CartRemote,
    S: KeyValueStore,
    O: OrderService,
{
    fn drop(&mut self) {
        if let Some(open) = self.payment.take() {
            open.handle.close();
        }
    }
}

/// The gateway opened for the frozen order.
struct OpenPayment {
    handle: GatewayHandle,
    transaction_id: TransactionId,
}
