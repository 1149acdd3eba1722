use actix_web::{http::header, middleware::from_fn, web, HttpResponse, Result};
use askama::Template;
use serde::Deserialize;

use crate::{
    auth::{admin_session_cookie, password_matches, require_admin, validate_password_change},
    filters,
    models::{
        Appointment, Barber, DayHours, Service, ServiceIcon, SiteContent, SocialLinks,
        WEEKDAY_NAMES,
    },
    state::AppState,
    templates::render,
};

#[derive(Template)]
#[template(path = "login.html")]
struct AdminLoginTemplate {
    site: SiteContent,
    heading: &'static str,
    action: &'static str,
    error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "admin_appointments.html")]
struct AppointmentsTemplate {
    site: SiteContent,
    tab: &'static str,
    appointments: Vec<Appointment>,
}

#[derive(Clone, Debug, Default)]
struct ServiceFormView {
    id: String,
    name: String,
    price: String,
    duration: String,
    icon: String,
}

#[derive(Clone, Debug)]
struct IconOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "admin_services.html")]
struct ServicesTemplate {
    site: SiteContent,
    tab: &'static str,
    services: Vec<Service>,
    form: ServiceFormView,
    editing: bool,
    icons: Vec<IconOption>,
    errors: Vec<String>,
}

#[derive(Clone, Debug, Default)]
struct BarberFormView {
    id: String,
    name: String,
    image_url: String,
}

#[derive(Template)]
#[template(path = "admin_barbers.html")]
struct BarbersTemplate {
    site: SiteContent,
    tab: &'static str,
    barbers: Vec<Barber>,
    form: BarberFormView,
    editing: bool,
    errors: Vec<String>,
}

#[derive(Clone, Debug)]
struct HourOption {
    value: u32,
    label: String,
    selected: bool,
}

#[derive(Clone, Debug)]
struct DayRow {
    name: &'static str,
    day_of_week: u8,
    is_open: bool,
    opening: Vec<HourOption>,
    closing: Vec<HourOption>,
    lunch_start: Vec<HourOption>,
    lunch_end: Vec<HourOption>,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin_schedule.html")]
struct ScheduleTemplate {
    site: SiteContent,
    tab: &'static str,
    days: Vec<DayRow>,
}

#[derive(Template)]
#[template(path = "admin_content.html")]
struct ContentTemplate {
    site: SiteContent,
    tab: &'static str,
    content: SiteContent,
    saved: bool,
}

#[derive(Template)]
#[template(path = "admin_security.html")]
struct SecurityTemplate {
    site: SiteContent,
    tab: &'static str,
    error: Option<&'static str>,
    saved: bool,
}

#[derive(Deserialize)]
struct LoginForm {
    password: String,
}

#[derive(Deserialize)]
struct EditQuery {
    edit: Option<String>,
}

#[derive(Deserialize)]
struct SavedQuery {
    saved: Option<String>,
}

#[derive(Deserialize)]
struct ServiceForm {
    id: Option<String>,
    name: String,
    price: String,
    duration: String,
    icon: String,
}

#[derive(Deserialize)]
struct BarberForm {
    id: Option<String>,
    name: String,
    image_url: String,
}

#[derive(Deserialize)]
struct DayForm {
    is_open: Option<String>,
    opening: String,
    closing: String,
    lunch_start: String,
    lunch_end: String,
}

#[derive(Deserialize)]
struct ContentForm {
    logo_name: String,
    about_text: String,
    footer_address: String,
    footer_phone: String,
    footer_email: String,
    instagram: String,
    facebook: String,
    whatsapp: String,
}

#[derive(Deserialize)]
struct SecurityForm {
    current_password: String,
    new_password: String,
    confirm_password: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/admin/login")
            .route(web::get().to(login_form))
            .route(web::post().to(login)),
    )
    .service(
        web::scope("/admin")
            .wrap(from_fn(require_admin))
            .service(web::resource("").route(web::get().to(index)))
            .service(web::resource("/").route(web::get().to(index)))
            .service(web::resource("/appointments").route(web::get().to(appointments)))
            .service(
                web::resource("/appointments/{id}/delete")
                    .route(web::post().to(delete_appointment)),
            )
            .service(
                web::resource("/services")
                    .route(web::get().to(services))
                    .route(web::post().to(save_service)),
            )
            .service(web::resource("/services/{id}/delete").route(web::post().to(delete_service)))
            .service(
                web::resource("/barbers")
                    .route(web::get().to(barbers))
                    .route(web::post().to(save_barber)),
            )
            .service(web::resource("/barbers/{id}/delete").route(web::post().to(delete_barber)))
            .service(web::resource("/schedule").route(web::get().to(schedule)))
            .service(web::resource("/schedule/{day}").route(web::post().to(save_day)))
            .service(
                web::resource("/content")
                    .route(web::get().to(content))
                    .route(web::post().to(save_content)),
            )
            .service(
                web::resource("/security")
                    .route(web::get().to(security))
                    .route(web::post().to(change_password)),
            ),
    );
}

async fn index() -> HttpResponse {
    see_other("/admin/appointments")
}

async fn login_form(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(render(AdminLoginTemplate {
        site: state.read().site_content.clone(),
        heading: "Acesso Restrito",
        action: "/admin/login",
        error: None,
    }))
}

async fn login(state: web::Data<AppState>, form: web::Form<LoginForm>) -> Result<HttpResponse> {
    let granted = password_matches(&state.read(), &form.password);
    if !granted {
        return Ok(render(AdminLoginTemplate {
            site: state.read().site_content.clone(),
            heading: "Acesso Restrito",
            action: "/admin/login",
            error: Some("Senha incorreta."),
        }));
    }

    Ok(HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/admin/appointments"))
        .cookie(admin_session_cookie())
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish())
}

async fn appointments(state: web::Data<AppState>) -> Result<HttpResponse> {
    let db = state.read();
    Ok(render(AppointmentsTemplate {
        site: db.site_content.clone(),
        tab: "appointments",
        appointments: db.appointments.clone(),
    }))
}

async fn delete_appointment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    state.update(|db| db.remove_appointment(id));
    log::info!("Appointment {id} removed by admin");
    Ok(see_other("/admin/appointments"))
}

async fn services(
    state: web::Data<AppState>,
    query: web::Query<EditQuery>,
) -> Result<HttpResponse> {
    let db = state.read();
    let editing = parse_id(&query.edit).and_then(|id| db.service(id));
    let form = match editing {
        Some(service) => ServiceFormView {
            id: service.id.to_string(),
            name: service.name.clone(),
            price: format!("{:.2}", service.price),
            duration: service.duration.to_string(),
            icon: service.icon.as_str().to_string(),
        },
        None => blank_service_form(),
    };

    Ok(render(ServicesTemplate {
        site: db.site_content.clone(),
        tab: "services",
        services: db.services.clone(),
        editing: editing.is_some(),
        icons: icon_options(&form.icon),
        form,
        errors: Vec::new(),
    }))
}

async fn save_service(
    state: web::Data<AppState>,
    form: web::Form<ServiceForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let name = form.name.trim().to_string();
    let price = form.price.trim().replace(',', ".").parse::<f64>().ok();
    let duration = form.duration.trim().parse::<u32>().ok();
    let icon = ServiceIcon::parse(form.icon.trim());
    let id = parse_id(&form.id);

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("Informe o nome do serviço.".to_string());
    }
    match price {
        Some(value) if value >= 0.0 => {}
        _ => errors.push("Informe um preço válido.".to_string()),
    }
    match duration {
        Some(value) if value >= 1 => {}
        _ => errors.push("Informe uma duração válida, em minutos.".to_string()),
    }
    if icon.is_none() {
        errors.push("Escolha um ícone.".to_string());
    }

    if !errors.is_empty() {
        let db = state.read();
        let view = ServiceFormView {
            id: form.id.unwrap_or_default(),
            name: form.name,
            price: form.price,
            duration: form.duration,
            icon: form.icon,
        };
        return Ok(render(ServicesTemplate {
            site: db.site_content.clone(),
            tab: "services",
            services: db.services.clone(),
            editing: id.is_some(),
            icons: icon_options(&view.icon),
            form: view,
            errors,
        }));
    }

    let (name, price, duration, icon) = (
        name,
        price.unwrap_or_default(),
        duration.unwrap_or_default(),
        icon.unwrap_or(ServiceIcon::Cut),
    );
    state.update(|db| match id {
        Some(id) => {
            db.update_service(id, name.clone(), price, duration, icon);
        }
        None => {
            db.add_service(name.clone(), price, duration, icon);
        }
    });

    Ok(see_other("/admin/services"))
}

async fn delete_service(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let id = path.into_inner();
    state.update(|db| db.remove_service(id));
    Ok(see_other("/admin/services"))
}

async fn barbers(state: web::Data<AppState>, query: web::Query<EditQuery>) -> Result<HttpResponse> {
    let db = state.read();
    let editing = parse_id(&query.edit).and_then(|id| db.barber(id));
    let form = match editing {
        Some(barber) => BarberFormView {
            id: barber.id.to_string(),
            name: barber.name.clone(),
            image_url: barber.image_url.clone(),
        },
        None => BarberFormView::default(),
    };

    Ok(render(BarbersTemplate {
        site: db.site_content.clone(),
        tab: "barbers",
        barbers: db.barbers.clone(),
        editing: editing.is_some(),
        form,
        errors: Vec::new(),
    }))
}

async fn save_barber(
    state: web::Data<AppState>,
    form: web::Form<BarberForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let name = form.name.trim().to_string();
    let image_url = form.image_url.trim().to_string();
    let id = parse_id(&form.id);

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("Informe o nome do barbeiro.".to_string());
    }
    if image_url.is_empty() {
        errors.push("Informe a URL da foto.".to_string());
    }

    if !errors.is_empty() {
        let db = state.read();
        return Ok(render(BarbersTemplate {
            site: db.site_content.clone(),
            tab: "barbers",
            barbers: db.barbers.clone(),
            editing: id.is_some(),
            form: BarberFormView {
                id: form.id.unwrap_or_default(),
                name: form.name,
                image_url: form.image_url,
            },
            errors,
        }));
    }

    state.update(|db| match id {
        Some(id) => {
            db.update_barber(id, name.clone(), image_url.clone());
        }
        None => {
            db.add_barber(name.clone(), image_url.clone());
        }
    });

    Ok(see_other("/admin/barbers"))
}

async fn delete_barber(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let id = path.into_inner();
    state.update(|db| db.remove_barber(id));
    Ok(see_other("/admin/barbers"))
}

async fn schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(render(schedule_template(&state, None)))
}

async fn save_day(
    state: web::Data<AppState>,
    path: web::Path<u8>,
    form: web::Form<DayForm>,
) -> Result<HttpResponse> {
    let day_of_week = path.into_inner();
    if day_of_week > 6 {
        return Ok(see_other("/admin/schedule"));
    }

    let form = form.into_inner();
    let is_open = form.is_open.is_some();
    let hours = [
        parse_hour(&form.opening),
        parse_hour(&form.closing),
        parse_hour(&form.lunch_start),
        parse_hour(&form.lunch_end),
    ];

    let [Some(opening), Some(closing), Some(lunch_start), Some(lunch_end)] = hours else {
        return Ok(render(schedule_template(
            &state,
            Some((day_of_week, "Horário inválido.")),
        )));
    };

    // Open days need a coherent window. The lunch pair is intentionally not
    // validated here; the slot computation tolerates any configuration.
    if is_open && opening >= closing {
        return Ok(render(schedule_template(
            &state,
            Some((day_of_week, "A abertura deve ser antes do fechamento.")),
        )));
    }

    state.update(|db| {
        db.set_day_hours(DayHours {
            day_of_week,
            is_open,
            opening,
            closing,
            lunch_start,
            lunch_end,
        })
    });

    Ok(see_other("/admin/schedule"))
}

async fn content(state: web::Data<AppState>, query: web::Query<SavedQuery>) -> Result<HttpResponse> {
    let db = state.read();
    Ok(render(ContentTemplate {
        site: db.site_content.clone(),
        tab: "content",
        content: db.site_content.clone(),
        saved: query.saved.is_some(),
    }))
}

async fn save_content(
    state: web::Data<AppState>,
    form: web::Form<ContentForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    state.update(|db| {
        db.site_content = SiteContent {
            logo_name: form.logo_name.trim().to_string(),
            about_text: form.about_text.trim().to_string(),
            footer_address: form.footer_address.trim().to_string(),
            footer_phone: form.footer_phone.trim().to_string(),
            footer_email: form.footer_email.trim().to_string(),
            social_links: SocialLinks {
                instagram: form.instagram.trim().to_string(),
                facebook: form.facebook.trim().to_string(),
                whatsapp: form.whatsapp.trim().to_string(),
            },
        };
    });

    Ok(see_other("/admin/content?saved=1"))
}

async fn security(
    state: web::Data<AppState>,
    query: web::Query<SavedQuery>,
) -> Result<HttpResponse> {
    Ok(render(SecurityTemplate {
        site: state.read().site_content.clone(),
        tab: "security",
        error: None,
        saved: query.saved.is_some(),
    }))
}

async fn change_password(
    state: web::Data<AppState>,
    form: web::Form<SecurityForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let outcome = {
        let db = state.read();
        validate_password_change(
            &form.current_password,
            &db.admin_password,
            &form.new_password,
            &form.confirm_password,
        )
    };

    if let Err(message) = outcome {
        return Ok(render(SecurityTemplate {
            site: state.read().site_content.clone(),
            tab: "security",
            error: Some(message),
            saved: false,
        }));
    }

    state.update(|db| db.admin_password = form.new_password.clone());
    log::info!("Admin password changed");
    Ok(see_other("/admin/security?saved=1"))
}

fn schedule_template(
    state: &web::Data<AppState>,
    error: Option<(u8, &str)>,
) -> ScheduleTemplate {
    let db = state.read();
    let days = (0..7u8)
        .map(|weekday| {
            let hours = db.schedule_for(weekday).cloned().unwrap_or(DayHours {
                day_of_week: weekday,
                is_open: false,
                opening: 9,
                closing: 18,
                lunch_start: 12,
                lunch_end: 13,
            });
            DayRow {
                name: WEEKDAY_NAMES[usize::from(weekday)],
                day_of_week: weekday,
                is_open: hours.is_open,
                opening: hour_options(hours.opening),
                closing: hour_options(hours.closing),
                lunch_start: hour_options(hours.lunch_start),
                lunch_end: hour_options(hours.lunch_end),
                error: error
                    .filter(|(day, _)| *day == weekday)
                    .map(|(_, message)| message.to_string()),
            }
        })
        .collect();

    ScheduleTemplate {
        site: db.site_content.clone(),
        tab: "schedule",
        days,
    }
}

fn hour_options(selected: u32) -> Vec<HourOption> {
    (0..24)
        .map(|hour| HourOption {
            value: hour,
            label: format!("{hour:02}:00"),
            selected: hour == selected,
        })
        .collect()
}

fn blank_service_form() -> ServiceFormView {
    ServiceFormView {
        id: String::new(),
        name: String::new(),
        price: String::new(),
        duration: "30".to_string(),
        icon: ServiceIcon::Cut.as_str().to_string(),
    }
}

fn icon_options(selected: &str) -> Vec<IconOption> {
    ServiceIcon::ALL
        .into_iter()
        .map(|icon| IconOption {
            value: icon.as_str(),
            label: icon.label(),
            selected: icon.as_str() == selected,
        })
        .collect()
}

fn parse_id(raw: &Option<String>) -> Option<i64> {
    let raw = raw.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}

fn parse_hour(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|hour| *hour <= 23)
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location.to_string()))
        .finish()
}
