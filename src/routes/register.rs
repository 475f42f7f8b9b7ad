use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::json;

use crate::dto::customer_dto::CreateCustomerPayload;
use crate::error::{Error, Result};
use crate::utils::extract::FormPayload;
use crate::AppState;

const REGISTER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Customer Registration</title>
</head>
<body>
  <h1>Customer Registration</h1>
  <p>Submit your details and our team will review your registration.</p>
  <form method="post" action="/register">
    <label>First Name <span>*</span><input name="firstName" required /></label>
    <label>Last Name <span>*</span><input name="lastName" required /></label>
    <label>Email <span>*</span><input name="email" type="email" required /></label>
    <label>Phone<input name="phone" /></label>
    <label>Company<input name="company" /></label>
    <label>Address<input name="address" /></label>
    <label>City<input name="city" /></label>
    <label>State<input name="state" /></label>
    <label>Country<input name="country" /></label>
    <label>Zip Code<input name="zipCode" /></label>
    <label>Notes<textarea name="notes"></textarea></label>
    <button type="submit">Register</button>
  </form>
</body>
</html>
"#;

/// GET /register: the public registration form.
pub async fn registration_form() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

/// POST /register: public form submission; new registrations always start
/// out pending.
pub async fn submit_registration(
    State(state): State<AppState>,
    FormPayload(payload): FormPayload<CreateCustomerPayload>,
) -> Result<impl IntoResponse> {
    let customer = state.customer_service.create(payload).await.map_err(|e| {
        tracing::error!(error = ?e, "Registration failed");
        match e {
            // the public form reports duplicates as a plain validation error
            Error::DuplicateEmail(_) => {
                Error::BadRequest("This email is already registered".to_string())
            }
            other => other,
        }
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration submitted successfully! Your account will be reviewed by our team.",
        "customerId": customer.id,
    })))
}
