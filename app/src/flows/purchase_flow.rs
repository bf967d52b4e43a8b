// app/src/flows/purchase_flow.rs

//! Initiate purchase: pending order first, then the hosted checkout.

use crate::errors::{AppError, Result as AppResult};
use crate::flows::common_steps;
use crate::flows::contexts::PurchaseCtx;
use crate::models::{AvailabilityStatus, NewOrder, OrderStatus, PaymentStatus};
use crate::services::email_templates::{self, PurchaseDetails};
use crate::services::payment_gateway::CheckoutRequest;
use carpluto_flow::{Flow, FlowData, FlowRegistry, FlowResult, StepControl, StepDef};
use chrono::{Duration, Utc};
use rand_core::{OsRng, RngCore};
use serde_json::json;
use tracing::{error, info, instrument, warn};

/// Earliest delivery date offered, in days from today.
pub const MIN_DELIVERY_LEAD_DAYS: i64 = 7;

pub fn register_purchase_flow(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut flow = Flow::<PurchaseCtx, AppError>::new(
    "purchase",
    vec![
      StepDef::required("validate_purchase"),
      StepDef::required("create_pending_order"),
      StepDef::required("initialize_checkout"),
      StepDef::optional("send_purchase_confirmation"),
    ],
  );

  flow.on("validate_purchase", validate_purchase)?;
  flow.on("create_pending_order", create_pending_order)?;
  flow.on("initialize_checkout", initialize_checkout)?;
  flow.on("send_purchase_confirmation", send_purchase_confirmation)?;

  registry.register(flow);
  info!("Purchase flow registered.");
  Ok(())
}

/// Naira to kobo, `None` when the amount does not fit the gateway's integer.
pub fn to_kobo(naira: i64) -> Option<i64> {
  naira.checked_mul(100)
}

/// `EV-<unix millis>-<4 hex>`; the suffix keeps two purchases in the same
/// millisecond apart.
pub fn generate_order_number() -> String {
  let suffix = OsRng.next_u32() & 0xffff;
  format!("EV-{}-{:04X}", Utc::now().timestamp_millis(), suffix)
}

#[instrument(name = "purchase::validate_purchase", skip_all, err(Display))]
async fn validate_purchase(ctx: FlowData<PurchaseCtx>) -> AppResult<StepControl> {
  let (store, car_id, address, delivery_date) = ctx.with(|c| {
    (
      c.app_state.store.clone(),
      c.car_id,
      c.delivery_address.trim().to_string(),
      c.delivery_date,
    )
  });

  if address.is_empty() {
    return Err(AppError::Validation("Delivery address is required.".to_string()));
  }
  if let Some(date) = delivery_date {
    let earliest = Utc::now().date_naive() + Duration::days(MIN_DELIVERY_LEAD_DAYS);
    if date < earliest {
      return Err(AppError::Validation(format!(
        "Delivery date must be on or after {}.",
        earliest
      )));
    }
  }

  let car = common_steps::load_car(store.as_ref(), car_id).await?;
  if car.availability_status == AvailabilityStatus::Sold.as_str() {
    return Err(AppError::Validation(format!("{} has already been sold.", car.display_name())));
  }
  let amount_kobo = to_kobo(car.price)
    .filter(|amount| *amount > 0)
    .ok_or_else(|| AppError::Validation(format!("{} cannot be paid for online.", car.display_name())))?;

  ctx.update(|c| {
    c.delivery_address = address;
    c.amount_kobo = amount_kobo;
    c.car = Some(car);
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "purchase::create_pending_order", skip_all, err(Display))]
async fn create_pending_order(ctx: FlowData<PurchaseCtx>) -> AppResult<StepControl> {
  let (store, new_order) = {
    let guard = ctx.read();
    let car = guard
      .car
      .as_ref()
      .ok_or_else(|| AppError::Internal("Vehicle not loaded before order creation.".to_string()))?;
    let new_order = NewOrder {
      order_number: generate_order_number(),
      user_id: guard.customer.user_id,
      car_id: car.id,
      total_amount: car.price,
      delivery_address: guard.delivery_address.clone(),
      delivery_date: guard.delivery_date,
      notes: guard.notes.clone(),
    };
    (guard.app_state.store.clone(), new_order)
  };

  let order = store.insert_order(&new_order.into_order()).await?;
  info!(order_id = %order.id, order_number = %order.order_number, "Pending order created.");
  ctx.write().order = Some(order);
  Ok(StepControl::Continue)
}

#[instrument(name = "purchase::initialize_checkout", skip_all, err(Display))]
async fn initialize_checkout(ctx: FlowData<PurchaseCtx>) -> AppResult<StepControl> {
  let (state, order, request) = {
    let guard = ctx.read();
    let (Some(order), Some(car)) = (guard.order.clone(), guard.car.as_ref()) else {
      return Err(AppError::Internal("Order not created before checkout.".to_string()));
    };
    let request = CheckoutRequest {
      email: guard.customer.email.clone(),
      amount: guard.amount_kobo,
      reference: order.order_number.clone(),
      callback_url: guard.app_state.config.payment_callback_url.clone(),
      metadata: json!({
        "order_id": order.id,
        "order_number": order.order_number,
        "car_id": car.id,
        "car_name": car.display_name(),
        "customer_name": guard.customer.name,
        "delivery_address": guard.delivery_address,
        "notes": guard.notes,
      }),
    };
    (guard.app_state.clone(), order, request)
  };

  let session = match state.gateway.initialize(&request).await {
    Ok(session) => session,
    Err(gateway_err) => {
      error!(order_id = %order.id, error = %gateway_err, "Checkout initialisation failed; cancelling order.");
      let compensation = state
        .store
        .set_order_state(order.id, Some(OrderStatus::Cancelled), Some(PaymentStatus::Failed))
        .await;
      match compensation {
        Ok(Some(cancelled)) => ctx.write().order = Some(cancelled),
        Ok(None) => warn!(order_id = %order.id, "Order vanished before it could be cancelled."),
        Err(e) => error!(order_id = %order.id, error = %e, "Failed to cancel order after checkout failure."),
      }
      return Err(gateway_err);
    }
  };

  // Settlement falls back to the order number, so a failed write here
  // leaves the order reachable.
  let updated = match state.store.attach_gateway_reference(order.id, &session.reference).await {
    Ok(Some(updated)) => updated,
    Ok(None) => order.clone(),
    Err(e) => {
      error!(order_id = %order.id, error = %e, "Could not store gateway reference on order.");
      order.clone()
    }
  };
  info!(order_id = %updated.id, reference = %session.reference, "Checkout session attached to order.");

  ctx.update(|c| {
    c.order = Some(updated);
    c.checkout = Some(session);
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "purchase::send_purchase_confirmation", skip_all)]
async fn send_purchase_confirmation(ctx: FlowData<PurchaseCtx>) -> AppResult<StepControl> {
  let snapshot = {
    let guard = ctx.read();
    match (&guard.order, &guard.car) {
      (Some(order), Some(car)) => Some((
        guard.app_state.clone(),
        guard.customer.clone(),
        order.clone(),
        car.display_name(),
        guard.checkout.as_ref().map(|c| c.authorization_url.clone()),
      )),
      _ => None,
    }
  };
  let Some((state, customer, order, vehicle_name, payment_link)) = snapshot else {
    warn!("Purchase confirmation skipped: order details missing.");
    return Ok(StepControl::Continue);
  };

  let order_id = order.id.to_string();
  let rendered = email_templates::purchase_confirmation(
    &state.config,
    &PurchaseDetails {
      customer_name: &customer.name,
      vehicle_name: &vehicle_name,
      amount: order.total_amount,
      order_id: &order_id,
      order_number: &order.order_number,
      payment_link: payment_link.as_deref(),
    },
  );
  let sent = common_steps::deliver_email(
    state.mailer.as_ref(),
    &state.config.email_from_orders,
    &customer.email,
    rendered,
  )
  .await;
  ctx.write().confirmation_sent = sent;
  Ok(StepControl::Continue)
}
