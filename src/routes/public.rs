use actix_web::{http::header, web, HttpResponse, Result};
use askama::Template;
use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::{
    auth::clear_session_cookies,
    availability::available_slots,
    filters,
    models::{Barber, Service, SiteContent, MONTH_NAMES, WEEKDAY_NAMES_SHORT},
    state::AppState,
    templates::render,
};

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    site: SiteContent,
    services: Vec<Service>,
}

#[derive(Template)]
#[template(path = "book_barber.html")]
struct BookBarberTemplate {
    site: SiteContent,
    service: Service,
    barbers: Vec<Barber>,
}

#[derive(Clone, Debug)]
struct DayCell {
    number: u32,
    value: String,
    disabled: bool,
    selected: bool,
    is_today: bool,
}

#[derive(Template)]
#[template(path = "book_time.html")]
struct BookTimeTemplate {
    site: SiteContent,
    service: Service,
    barber: Barber,
    month_label: String,
    month_value: String,
    prev_month: String,
    next_month: String,
    weekdays: [&'static str; 7],
    cells: Vec<Option<DayCell>>,
    selected_date: Option<NaiveDate>,
    slots: Vec<NaiveDateTime>,
}

#[derive(Template)]
#[template(path = "book_confirm.html")]
struct BookConfirmTemplate {
    site: SiteContent,
    service: Service,
    barber: Barber,
    slot: NaiveDateTime,
    customer_name: String,
    customer_phone: String,
    errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "book_success.html")]
struct BookSuccessTemplate {
    site: SiteContent,
    service: Service,
    barber: Barber,
    slot: NaiveDateTime,
    customer_name: String,
}

#[derive(Deserialize)]
struct SelectionQuery {
    service: Option<String>,
    barber: Option<String>,
    month: Option<String>,
    date: Option<String>,
    slot: Option<String>,
}

#[derive(Deserialize)]
struct BookingForm {
    service: String,
    barber: String,
    slot: String,
    customer_name: String,
    customer_phone: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/book").route(web::get().to(restart_booking)))
        .service(web::resource("/book/barber").route(web::get().to(choose_barber)))
        .service(web::resource("/book/time").route(web::get().to(choose_time)))
        .service(
            web::resource("/book/confirm")
                .route(web::get().to(confirm_details))
                .route(web::post().to(create_booking)),
        )
        .service(web::resource("/logout").route(web::get().to(logout)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn home(state: web::Data<AppState>) -> Result<HttpResponse> {
    let db = state.read();
    Ok(render(HomeTemplate {
        site: db.site_content.clone(),
        services: db.services.clone(),
    }))
}

/// The wizard always restarts from the service step.
async fn restart_booking() -> HttpResponse {
    see_other("/")
}

async fn logout() -> HttpResponse {
    let [admin, appointments] = clear_session_cookies();
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/"))
        .cookie(admin)
        .cookie(appointments)
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

async fn choose_barber(
    state: web::Data<AppState>,
    query: web::Query<SelectionQuery>,
) -> Result<HttpResponse> {
    let db = state.read();
    let Some(service) = parse_id(&query.service).and_then(|id| db.service(id)) else {
        return Ok(see_other("/"));
    };

    Ok(render(BookBarberTemplate {
        site: db.site_content.clone(),
        service: service.clone(),
        barbers: db.barbers.clone(),
    }))
}

async fn choose_time(
    state: web::Data<AppState>,
    query: web::Query<SelectionQuery>,
) -> Result<HttpResponse> {
    let db = state.read();
    let Some(service) = parse_id(&query.service).and_then(|id| db.service(id)) else {
        return Ok(see_other("/"));
    };
    let Some(barber) = parse_id(&query.barber).and_then(|id| db.barber(id)) else {
        return Ok(see_other(&format!("/book/barber?service={}", service.id)));
    };

    let now = Local::now().naive_local();
    let today = now.date();

    let first_of_month = query
        .month
        .as_deref()
        .and_then(parse_month)
        .unwrap_or_else(|| today.with_day(1).unwrap_or(today));

    let selected_date = query
        .date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .filter(|date| *date >= today && is_open_day(&db.schedule, *date));

    let slots = match selected_date {
        Some(date) => available_slots(
            date,
            barber.id,
            service.duration,
            &db.schedule,
            &db.appointments,
            now,
        )
        .collect(),
        None => Vec::new(),
    };

    let mut cells: Vec<Option<DayCell>> = Vec::new();
    for _ in 0..first_of_month.weekday().num_days_from_sunday() {
        cells.push(None);
    }
    let mut day = first_of_month;
    while day.month() == first_of_month.month() {
        cells.push(Some(DayCell {
            number: day.day(),
            value: day.format("%Y-%m-%d").to_string(),
            disabled: day < today || !is_open_day(&db.schedule, day),
            selected: selected_date == Some(day),
            is_today: day == today,
        }));
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    let month_label = format!(
        "{} de {}",
        MONTH_NAMES[first_of_month.month0() as usize],
        first_of_month.year()
    );

    Ok(render(BookTimeTemplate {
        site: db.site_content.clone(),
        service: service.clone(),
        barber: barber.clone(),
        month_label,
        month_value: first_of_month.format("%Y-%m").to_string(),
        prev_month: shift_month(first_of_month, -1),
        next_month: shift_month(first_of_month, 1),
        weekdays: WEEKDAY_NAMES_SHORT,
        cells,
        selected_date,
        slots,
    }))
}

async fn confirm_details(
    state: web::Data<AppState>,
    query: web::Query<SelectionQuery>,
) -> Result<HttpResponse> {
    let db = state.read();
    let Some((service, barber, slot)) = resolve_selection(
        &db,
        query.service.as_deref().unwrap_or_default(),
        query.barber.as_deref().unwrap_or_default(),
        query.slot.as_deref().unwrap_or_default(),
    ) else {
        return Ok(see_other("/"));
    };

    Ok(render(BookConfirmTemplate {
        site: db.site_content.clone(),
        service,
        barber,
        slot,
        customer_name: String::new(),
        customer_phone: String::new(),
        errors: Vec::new(),
    }))
}

async fn create_booking(
    state: web::Data<AppState>,
    form: web::Form<BookingForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();

    let (service, barber, slot) = {
        let db = state.read();
        let Some(selection) = resolve_selection(&db, &form.service, &form.barber, &form.slot)
        else {
            return Ok(see_other("/"));
        };
        selection
    };

    let customer_name = form.customer_name.trim().to_string();
    let customer_phone = form.customer_phone.trim().to_string();

    let mut errors = Vec::new();
    if customer_name.is_empty() {
        errors.push("Informe seu nome.".to_string());
    }
    if customer_phone.is_empty() {
        errors.push("Informe seu telefone.".to_string());
    }

    // The selection may have gone stale since the slot page rendered; run
    // the availability check again against the current state.
    let now = Local::now().naive_local();
    {
        let db = state.read();
        let mut offered = available_slots(
            slot.date(),
            barber.id,
            service.duration,
            &db.schedule,
            &db.appointments,
            now,
        );
        if !offered.any(|s| s == slot) {
            errors.push("Este horário não está mais disponível. Escolha outro.".to_string());
        }
    }

    if !errors.is_empty() {
        let site = state.read().site_content.clone();
        return Ok(render(BookConfirmTemplate {
            site,
            service,
            barber,
            slot,
            customer_name: form.customer_name,
            customer_phone: form.customer_phone,
            errors,
        }));
    }

    state.update(|db| {
        db.append_appointment(
            service.clone(),
            barber.clone(),
            slot,
            customer_name.clone(),
            customer_phone.clone(),
        )
    });
    log::info!(
        "Appointment booked: {} with {} at {}",
        service.name,
        barber.name,
        slot
    );

    let site = state.read().site_content.clone();
    Ok(render(BookSuccessTemplate {
        site,
        service,
        barber,
        slot,
        customer_name,
    }))
}

fn resolve_selection(
    db: &crate::db::Database,
    service: &str,
    barber: &str,
    slot: &str,
) -> Option<(Service, Barber, NaiveDateTime)> {
    let service = db.service(service.trim().parse().ok()?)?.clone();
    let barber = db.barber(barber.trim().parse().ok()?)?.clone();
    let slot = slot.trim().parse::<NaiveDateTime>().ok()?;
    Some((service, barber, slot))
}

fn parse_id(raw: &Option<String>) -> Option<i64> {
    raw.as_deref()?.trim().parse().ok()
}

fn parse_month(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d").ok()
}

fn shift_month(first_of_month: NaiveDate, offset: i32) -> String {
    let shifted = if offset < 0 {
        first_of_month.checked_sub_months(Months::new(offset.unsigned_abs()))
    } else {
        first_of_month.checked_add_months(Months::new(offset as u32))
    };
    shifted
        .unwrap_or(first_of_month)
        .format("%Y-%m")
        .to_string()
}

fn is_open_day(schedule: &[crate::models::DayHours], date: NaiveDate) -> bool {
    let weekday = date.weekday().num_days_from_sunday();
    schedule
        .iter()
        .any(|d| u32::from(d.day_of_week) == weekday && d.is_open)
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location.to_string()))
        .finish()
}
