use actix_web::{http::header, web, HttpRequest, HttpResponse, Result};
use askama::Template;
use serde::Deserialize;

use crate::{
    auth::{appointments_session_cookie, can_view_appointments, password_matches},
    filters,
    models::{Appointment, SiteContent},
    state::AppState,
    templates::render,
};

#[derive(Template)]
#[template(path = "login.html")]
struct AppointmentsLoginTemplate {
    site: SiteContent,
    heading: &'static str,
    action: &'static str,
    error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "appointments.html")]
struct AppointmentsTemplate {
    site: SiteContent,
    appointments: Vec<Appointment>,
}

#[derive(Deserialize)]
struct LoginForm {
    password: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/appointments").route(web::get().to(list)))
        .service(
            web::resource("/appointments/login")
                .route(web::get().to(login_form))
                .route(web::post().to(login)),
        )
        .service(web::resource("/appointments/{id}/cancel").route(web::post().to(cancel)));
}

async fn list(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    if !can_view_appointments(&req) {
        return Ok(see_other("/appointments/login"));
    }

    let db = state.read();
    Ok(render(AppointmentsTemplate {
        site: db.site_content.clone(),
        // Kept sorted by start time on insertion.
        appointments: db.appointments.clone(),
    }))
}

async fn login_form(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    if can_view_appointments(&req) {
        return Ok(see_other("/appointments"));
    }
    Ok(render(AppointmentsLoginTemplate {
        site: state.read().site_content.clone(),
        heading: "Meus Agendamentos",
        action: "/appointments/login",
        error: None,
    }))
}

async fn login(state: web::Data<AppState>, form: web::Form<LoginForm>) -> Result<HttpResponse> {
    let granted = password_matches(&state.read(), &form.password);
    if !granted {
        return Ok(render(AppointmentsLoginTemplate {
            site: state.read().site_content.clone(),
            heading: "Meus Agendamentos",
            action: "/appointments/login",
            error: Some("Senha incorreta."),
        }));
    }

    Ok(HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/appointments"))
        .cookie(appointments_session_cookie())
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish())
}

async fn cancel(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if !can_view_appointments(&req) {
        return Ok(see_other("/appointments/login"));
    }

    let id = path.into_inner();
    state.update(|db| db.remove_appointment(id));
    log::info!("Appointment {id} cancelled");
    Ok(see_other("/appointments"))
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location.to_string()))
        .finish()
}
