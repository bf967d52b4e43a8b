// app/src/services/email_templates.rs

//! HTML bodies for the transactional emails.

use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
  pub subject: String,
  pub html: String,
}

/// `45000000` -> `₦45,000,000`.
pub fn format_naira(amount: i64) -> String {
  let digits = amount.unsigned_abs().to_string();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }
  if amount < 0 {
    format!("-₦{}", grouped)
  } else {
    format!("₦{}", grouped)
  }
}

pub fn escape_html(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for ch in input.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      other => out.push(other),
    }
  }
  out
}

fn whatsapp_link(phone: &str) -> String {
  let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
  format!("https://wa.me/{}", digits)
}

fn layout(config: &AppConfig, title: &str, content: &str) -> String {
  let brand = escape_html(&config.brand_name);
  let phone = escape_html(&config.support_phone);
  format!(
    r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="margin:0;padding:0;font-family:'Segoe UI',Tahoma,sans-serif;background-color:#f8fafc;">
  <div style="max-width:600px;margin:0 auto;background-color:#ffffff;border-radius:8px;overflow:hidden;">
    <div style="background-color:#E82127;padding:20px;text-align:center;color:#ffffff;font-size:24px;font-weight:bold;">{brand}</div>
    <div style="padding:30px;color:#475569;font-size:16px;line-height:1.6;">
{content}
      <p>Need help? Chat with us on WhatsApp: <a href="{whatsapp}" style="color:#E82127;">{phone}</a>.</p>
      <p>Welcome to the EV revolution!<br>{brand} Team</p>
    </div>
  </div>
</body>
</html>"#,
    title = escape_html(title),
    brand = brand,
    content = content,
    whatsapp = whatsapp_link(&config.support_phone),
    phone = phone,
  )
}

fn button(href: &str, label: &str) -> String {
  format!(
    r#"      <div style="text-align:center;margin:24px 0;"><a href="{}" style="background-color:#E82127;color:#ffffff;padding:14px 36px;text-decoration:none;border-radius:6px;font-weight:bold;display:inline-block;">{}</a></div>"#,
    escape_html(href),
    escape_html(label)
  )
}

pub fn welcome(config: &AppConfig, name: &str) -> RenderedEmail {
  let content = format!(
    r#"      <h1 style="color:#1e293b;">Hi {name},</h1>
      <p>Thanks for joining {brand}. Browse the latest electric vehicles, book a test drive and track your orders from your dashboard.</p>
{cta}"#,
    name = escape_html(name),
    brand = escape_html(&config.brand_name),
    cta = button(&format!("{}/vehicles", config.site_url), "Explore Vehicles"),
  );
  RenderedEmail {
    subject: format!("Welcome to {}! ⚡", config.brand_name),
    html: layout(config, "Welcome", &content),
  }
}

pub fn password_reset(config: &AppConfig, name: &str, token: &str, ttl_minutes: i64) -> RenderedEmail {
  let reset_url = format!("{}/reset-password?token={}", config.site_url, token);
  let content = format!(
    r#"      <h1 style="color:#1e293b;">Hi {name},</h1>
      <p>We received a request to reset your {brand} password. The link below works once and expires in {ttl} minutes.</p>
{cta}
      <p>If you did not ask for this, you can ignore this email; your password stays the same.</p>"#,
    name = escape_html(name),
    brand = escape_html(&config.brand_name),
    ttl = ttl_minutes,
    cta = button(&reset_url, "Reset Password"),
  );
  RenderedEmail {
    subject: format!("Reset your {} password", config.brand_name),
    html: layout(config, "Password reset", &content),
  }
}

/// Order summary with a pay link (when checkout is still open) and a track link.
pub struct PurchaseDetails<'a> {
  pub customer_name: &'a str,
  pub vehicle_name: &'a str,
  pub amount: i64,
  pub order_id: &'a str,
  pub order_number: &'a str,
  pub payment_link: Option<&'a str>,
}

pub fn purchase_confirmation(config: &AppConfig, details: &PurchaseDetails<'_>) -> RenderedEmail {
  let track_url = format!("{}/orders/{}", config.site_url, details.order_id);
  let pay = details
    .payment_link
    .map(|link| button(link, "Pay Now"))
    .unwrap_or_default();
  let content = format!(
    r#"      <h1 style="color:#1e293b;">Hi {name},</h1>
      <p style="font-weight:bold;font-size:18px;">Your {vehicle} is secured!</p>
      <ol>
        <li><strong>Payment:</strong> Complete via Paystack below</li>
        <li><strong>Delivery:</strong> Expect a call within 24hrs to schedule pickup or shipping</li>
      </ol>
{pay}
      <div style="background-color:#f1f5f9;padding:20px;border-radius:8px;">
        <p><strong>Vehicle:</strong> {vehicle}</p>
        <p><strong>Amount:</strong> {amount}</p>
        <p><strong>Order #:</strong> {order_number}</p>
      </div>
{track}"#,
    name = escape_html(details.customer_name),
    vehicle = escape_html(details.vehicle_name),
    pay = pay,
    amount = format_naira(details.amount),
    order_number = escape_html(details.order_number),
    track = button(&track_url, "Track Order"),
  );
  RenderedEmail {
    subject: format!("Congratulations! Your {} is Reserved 🎉", details.vehicle_name),
    html: layout(config, "Purchase Confirmation", &content),
  }
}

pub struct BookingDetails<'a> {
  pub customer_name: &'a str,
  pub vehicle_name: &'a str,
  pub booking_id: &'a str,
  pub date: &'a str,
  pub time: &'a str,
  pub location: &'a str,
}

pub fn test_drive_confirmation(config: &AppConfig, details: &BookingDetails<'_>) -> RenderedEmail {
  let modify_url = format!("{}/test-drive/modify/{}", config.site_url, details.booking_id);
  let content = format!(
    r#"      <h1 style="color:#1e293b;">Hi {name},</h1>
      <p>Your test drive of the <strong>{vehicle}</strong> is booked.</p>
      <div style="background-color:#f1f5f9;padding:20px;border-radius:8px;">
        <p><strong>Date:</strong> {date}</p>
        <p><strong>Time:</strong> {time}</p>
        <p><strong>Location:</strong> {location}</p>
      </div>
      <p>Please bring a valid driver's licence. Dealer contact: {phone}.</p>
{modify}"#,
    name = escape_html(details.customer_name),
    vehicle = escape_html(details.vehicle_name),
    date = escape_html(details.date),
    time = escape_html(details.time),
    location = escape_html(details.location),
    phone = escape_html(&config.support_phone),
    modify = button(&modify_url, "Modify Booking"),
  );
  RenderedEmail {
    subject: format!("Your {} Test Drive is Confirmed! 🚗", details.vehicle_name),
    html: layout(config, "Test Drive Confirmation", &content),
  }
}
