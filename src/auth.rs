use actix_web::{
    body::{BoxBody, MessageBody},
    cookie::{time::Duration, Cookie, SameSite},
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    Error, HttpRequest, HttpResponse,
};

use crate::db::Database;

const ADMIN_COOKIE: &str = "bb_admin";
const APPOINTMENTS_COOKIE: &str = "bb_appointments";

/// The shop runs on a single shared password kept in the snapshot as plain
/// text, compared with plain equality. Known-weak; kept as-is because there
/// is exactly one tenant and no per-user credential store to protect.
pub fn password_matches(db: &Database, input: &str) -> bool {
    db.admin_password == input
}

pub fn admin_session_cookie() -> Cookie<'static> {
    session_cookie(ADMIN_COOKIE)
}

pub fn appointments_session_cookie() -> Cookie<'static> {
    session_cookie(APPOINTMENTS_COOKIE)
}

pub fn clear_session_cookies() -> [Cookie<'static>; 2] {
    [expired_cookie(ADMIN_COOKIE), expired_cookie(APPOINTMENTS_COOKIE)]
}

pub fn is_admin(req: &HttpRequest) -> bool {
    req.cookie(ADMIN_COOKIE).is_some()
}

pub fn can_view_appointments(req: &HttpRequest) -> bool {
    req.cookie(APPOINTMENTS_COOKIE).is_some() || is_admin(req)
}

fn session_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "1")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(0))
        .finish()
}

/// Guard for the `/admin` scope: anyone without the admin session cookie is
/// sent to the login form.
pub async fn require_admin<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error>
where
    B: MessageBody + 'static,
{
    if !is_admin(req.request()) {
        let response = HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/admin/login"))
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish();
        return Ok(req.into_response(response));
    }

    let res = next.call(req).await?;
    Ok(res.map_into_boxed_body())
}

/// Rules for the security form: current password must match, the new one
/// needs at least 6 characters and a matching confirmation.
pub fn validate_password_change(
    current_input: &str,
    current_actual: &str,
    new_password: &str,
    confirmation: &str,
) -> Result<(), &'static str> {
    if current_input != current_actual {
        return Err("A senha atual está incorreta.");
    }
    if new_password.chars().count() < 6 {
        return Err("A nova senha deve ter pelo menos 6 caracteres.");
    }
    if new_password != confirmation {
        return Err("A nova senha e a confirmação não correspondem.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_change_requires_the_current_password() {
        assert_eq!(
            validate_password_change("errada", "atual", "novasenha", "novasenha"),
            Err("A senha atual está incorreta.")
        );
    }

    #[test]
    fn password_change_rejects_short_passwords() {
        assert_eq!(
            validate_password_change("atual", "atual", "curta", "curta"),
            Err("A nova senha deve ter pelo menos 6 caracteres.")
        );
    }

    #[test]
    fn password_change_requires_matching_confirmation() {
        assert_eq!(
            validate_password_change("atual", "atual", "novasenha", "outrasenha"),
            Err("A nova senha e a confirmação não correspondem.")
        );
    }

    #[test]
    fn password_change_accepts_valid_input() {
        assert_eq!(
            validate_password_change("atual", "atual", "novasenha", "novasenha"),
            Ok(())
        );
    }
}
