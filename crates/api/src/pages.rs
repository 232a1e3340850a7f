//! Browser-facing billing pages
//!
//! The checkout flow is hosted by Stripe; these are the thin pages the
//! browser lands on around it.

use axum::response::Html;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title} - Ledgerly</title></head>\n\
         <body>\n{body}\n</body>\n\
         </html>"
    ))
}

pub fn checkout_success() -> Html<String> {
    page(
        "Subscription active",
        "<h1>You're all set</h1>\n\
         <p>Your subscription is active. It can take a moment for the new\n\
         limits to show up on your dashboard.</p>\n\
         <p><a href=\"/dashboard\">Back to dashboard</a></p>",
    )
}

pub fn checkout_cancel() -> Html<String> {
    page(
        "Checkout cancelled",
        "<h1>Checkout cancelled</h1>\n\
         <p>No charge was made. You can pick a plan whenever you're ready.</p>\n\
         <p><a href=\"/pricing\">Back to pricing</a></p>",
    )
}

pub fn checkout_error(message: &str) -> Html<String> {
    let message = escape_html(message);
    page(
        "Checkout failed",
        &format!(
            "<h1>Something went wrong</h1>\n\
             <p>We couldn't start your checkout: {message}</p>\n\
             <p><a href=\"/pricing\">Back to pricing</a></p>"
        ),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
