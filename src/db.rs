use std::{fs, io, path::Path};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    Appointment, Barber, DayHours, Service, ServiceIcon, SiteContent, SocialLinks,
};

pub const DEFAULT_ADMIN_PASSWORD: &str = "fernando1984";

/// The whole persisted application state. Saved and loaded only as a full
/// snapshot; nothing ever writes a partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub services: Vec<Service>,
    pub barbers: Vec<Barber>,
    pub appointments: Vec<Appointment>,
    pub schedule: Vec<DayHours>,
    pub site_content: SiteContent,
    pub admin_password: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Database {
    pub fn schedule_for(&self, weekday: u8) -> Option<&DayHours> {
        self.schedule.iter().find(|d| d.day_of_week == weekday)
    }

    pub fn service(&self, id: i64) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn barber(&self, id: i64) -> Option<&Barber> {
        self.barbers.iter().find(|b| b.id == id)
    }

    /// Books an appointment, embedding copies of the service and barber as
    /// they exist right now. Returns the assigned id. The collection stays
    /// ordered by start time.
    pub fn append_appointment(
        &mut self,
        service: Service,
        barber: Barber,
        date: NaiveDateTime,
        customer_name: String,
        customer_phone: String,
    ) -> i64 {
        let id = self.next_id(self.appointments.iter().map(|a| a.id));
        self.appointments.push(Appointment {
            id,
            service,
            barber,
            date,
            customer_name,
            customer_phone,
        });
        self.appointments.sort_by_key(|a| a.date);
        id
    }

    /// Deletes by id; absent ids are a no-op.
    pub fn remove_appointment(&mut self, id: i64) {
        self.appointments.retain(|a| a.id != id);
    }

    pub fn add_service(
        &mut self,
        name: String,
        price: f64,
        duration: u32,
        icon: ServiceIcon,
    ) -> i64 {
        let id = self.next_id(self.services.iter().map(|s| s.id));
        self.services.push(Service {
            id,
            name,
            price,
            duration,
            icon,
        });
        id
    }

    /// Edits the catalog entry only. Appointments keep the copy they took at
    /// booking time.
    pub fn update_service(
        &mut self,
        id: i64,
        name: String,
        price: f64,
        duration: u32,
        icon: ServiceIcon,
    ) -> bool {
        match self.services.iter_mut().find(|s| s.id == id) {
            Some(service) => {
                service.name = name;
                service.price = price;
                service.duration = duration;
                service.icon = icon;
                true
            }
            None => false,
        }
    }

    pub fn remove_service(&mut self, id: i64) {
        self.services.retain(|s| s.id != id);
    }

    pub fn add_barber(&mut self, name: String, image_url: String) -> i64 {
        let id = self.next_id(self.barbers.iter().map(|b| b.id));
        self.barbers.push(Barber {
            id,
            name,
            image_url,
        });
        id
    }

    pub fn update_barber(&mut self, id: i64, name: String, image_url: String) -> bool {
        match self.barbers.iter_mut().find(|b| b.id == id) {
            Some(barber) => {
                barber.name = name;
                barber.image_url = image_url;
                true
            }
            None => false,
        }
    }

    pub fn remove_barber(&mut self, id: i64) {
        self.barbers.retain(|b| b.id != id);
    }

    pub fn set_day_hours(&mut self, hours: DayHours) {
        match self
            .schedule
            .iter_mut()
            .find(|d| d.day_of_week == hours.day_of_week)
        {
            Some(day) => *day = hours,
            None => {
                self.schedule.push(hours);
                self.schedule.sort_by_key(|d| d.day_of_week);
            }
        }
    }

    /// Ids come from the creation timestamp, bumped past every id already in
    /// the collection so they stay unique and increasing even when two
    /// records are created within the same millisecond.
    fn next_id(&self, existing: impl Iterator<Item = i64>) -> i64 {
        let stamp = Utc::now().timestamp_millis();
        stamp.max(existing.max().unwrap_or(0) + 1)
    }
}

/// Loads the snapshot, seeding and saving the defaults when none exists yet.
/// A present-but-unreadable snapshot is a startup error, not silently reset.
pub fn load_or_seed(path: &Path) -> Result<Database, StoreError> {
    if path.exists() {
        let raw = fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&raw)?);
    }

    log::info!("No snapshot at {}; seeding defaults", path.display());
    let db = seed_defaults();
    if db.admin_password == DEFAULT_ADMIN_PASSWORD {
        log::warn!("Using the default admin password. Change it under /admin/security.");
    }
    save(path, &db)?;
    Ok(db)
}

/// Serializes the full state as one JSON document, appointment dates as
/// ISO-8601 strings.
pub fn save(path: &Path, db: &Database) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let raw = serde_json::to_string_pretty(db)?;
    fs::write(path, raw)?;
    Ok(())
}

pub fn seed_defaults() -> Database {
    Database {
        services: vec![
            Service {
                id: 1,
                name: "Corte de Cabelo".into(),
                price: 50.0,
                duration: 45,
                icon: ServiceIcon::Cut,
            },
            Service {
                id: 2,
                name: "Barba".into(),
                price: 35.0,
                duration: 30,
                icon: ServiceIcon::Beard,
            },
            Service {
                id: 3,
                name: "Corte e Barba".into(),
                price: 80.0,
                duration: 75,
                icon: ServiceIcon::Shave,
            },
            Service {
                id: 4,
                name: "Pezinho".into(),
                price: 20.0,
                duration: 15,
                icon: ServiceIcon::Cut,
            },
        ],
        barbers: vec![
            Barber {
                id: 1,
                name: "Ricardo".into(),
                image_url: "https://picsum.photos/seed/ricardo/400/400".into(),
            },
            Barber {
                id: 2,
                name: "Fernando".into(),
                image_url: "https://picsum.photos/seed/fernando/400/400".into(),
            },
            Barber {
                id: 3,
                name: "Júnior".into(),
                image_url: "https://picsum.photos/seed/junior/400/400".into(),
            },
        ],
        appointments: Vec::new(),
        schedule: (0..7u8)
            .map(|day_of_week| {
                let (is_open, opening, closing) = match day_of_week {
                    0 => (false, 9, 18),
                    6 => (true, 10, 16),
                    _ => (true, 9, 19),
                };
                DayHours {
                    day_of_week,
                    is_open,
                    opening,
                    closing,
                    lunch_start: 12,
                    lunch_end: 13,
                }
            })
            .collect(),
        site_content: SiteContent {
            logo_name: "Barber Shop".into(),
            about_text: "Fundada em 2010, nossa barbearia combina a tradição da velha escola \
                         com técnicas modernas para oferecer uma experiência única. Nossos \
                         barbeiros são mestres em seus ofícios, dedicados a proporcionar cortes \
                         de cabelo e barbas impecáveis. Usamos apenas produtos da mais alta \
                         qualidade em um ambiente relaxante e acolhedor. Venha nos visitar e \
                         saia sentindo-se renovado e confiante."
                .into(),
            footer_address: "Rua da Barbearia, 123\nCentro, Cidade, UF\nCEP: 12345-678".into(),
            footer_phone: "(11) 98765-4321".into(),
            footer_email: "contato@barbershop.com".into(),
            social_links: SocialLinks {
                instagram: "https://instagram.com".into(),
                facebook: "https://facebook.com".into(),
                whatsapp: "https://wa.me/5511987654321".into(),
            },
        },
        admin_password: DEFAULT_ADMIN_PASSWORD.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_date(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn sample_service(db: &Database) -> Service {
        db.services[0].clone()
    }

    fn sample_barber(db: &Database) -> Barber {
        db.barbers[0].clone()
    }

    #[test]
    fn append_keeps_appointments_ordered_by_start() {
        let mut db = seed_defaults();
        let service = sample_service(&db);
        let barber = sample_barber(&db);

        db.append_appointment(
            service.clone(),
            barber.clone(),
            sample_date(14, 30),
            "Bruno Costa".into(),
            "21912345678".into(),
        );
        db.append_appointment(
            service,
            barber,
            sample_date(10, 0),
            "Carlos Silva".into(),
            "11987654321".into(),
        );

        let starts: Vec<_> = db.appointments.iter().map(|a| a.date).collect();
        assert_eq!(starts, vec![sample_date(10, 0), sample_date(14, 30)]);
    }

    #[test]
    fn appointment_ids_are_unique_and_increasing() {
        let mut db = seed_defaults();
        let service = sample_service(&db);
        let barber = sample_barber(&db);

        let first = db.append_appointment(
            service.clone(),
            barber.clone(),
            sample_date(10, 0),
            "Carlos Silva".into(),
            "11987654321".into(),
        );
        let second = db.append_appointment(
            service,
            barber,
            sample_date(10, 45),
            "Bruno Costa".into(),
            "21912345678".into(),
        );

        assert!(second > first);
    }

    #[test]
    fn remove_appointment_is_idempotent() {
        let mut db = seed_defaults();
        let service = sample_service(&db);
        let barber = sample_barber(&db);
        let id = db.append_appointment(
            service,
            barber,
            sample_date(10, 0),
            "Carlos Silva".into(),
            "11987654321".into(),
        );

        db.remove_appointment(id);
        assert!(db.appointments.is_empty());
        db.remove_appointment(id);
        assert!(db.appointments.is_empty());
    }

    #[test]
    fn editing_a_service_does_not_rewrite_booked_appointments() {
        let mut db = seed_defaults();
        let service = sample_service(&db);
        let barber = sample_barber(&db);
        db.append_appointment(
            service.clone(),
            barber,
            sample_date(10, 0),
            "Carlos Silva".into(),
            "11987654321".into(),
        );

        assert!(db.update_service(service.id, "Corte Premium".into(), 90.0, 60, ServiceIcon::Razor));
        db.remove_barber(db.appointments[0].barber.id);

        let booked = &db.appointments[0];
        assert_eq!(booked.service.name, service.name);
        assert_eq!(booked.service.price, service.price);
        assert_eq!(booked.service.duration, service.duration);
        assert_eq!(booked.barber.name, "Ricardo");
    }

    #[test]
    fn seed_covers_every_weekday_once() {
        let db = seed_defaults();
        assert_eq!(db.schedule.len(), 7);
        for weekday in 0..7u8 {
            assert!(db.schedule_for(weekday).is_some());
        }
        assert!(!db.schedule_for(0).unwrap().is_open);
        assert_eq!(db.schedule_for(6).unwrap().opening, 10);
    }

    #[test]
    fn snapshot_round_trip_is_lossless() {
        let mut db = seed_defaults();
        let service = sample_service(&db);
        let barber = sample_barber(&db);
        db.append_appointment(
            service,
            barber,
            sample_date(10, 0),
            "Carlos Silva".into(),
            "11987654321".into(),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        save(&path, &db).unwrap();
        let reloaded = load_or_seed(&path).unwrap();

        assert_eq!(reloaded, db);
    }

    #[test]
    fn snapshot_uses_the_documented_layout() {
        let db = seed_defaults();
        let raw = serde_json::to_value(&db).unwrap();
        let object = raw.as_object().unwrap();
        for key in [
            "services",
            "barbers",
            "appointments",
            "schedule",
            "siteContent",
            "adminPassword",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(object["services"][0].get("duration").is_some());
        assert!(object["schedule"][0].get("dayOfWeek").is_some());
        assert!(object["siteContent"].get("logoName").is_some());
    }

    #[test]
    fn appointment_dates_serialize_as_iso_strings() {
        let mut db = seed_defaults();
        let service = sample_service(&db);
        let barber = sample_barber(&db);
        db.append_appointment(
            service,
            barber,
            sample_date(10, 0),
            "Carlos Silva".into(),
            "11987654321".into(),
        );

        let raw = serde_json::to_value(&db).unwrap();
        let encoded = raw["appointments"][0]["date"].as_str().unwrap();
        assert_eq!(encoded, "2026-08-03T10:00:00");
    }

    #[test]
    fn missing_snapshot_seeds_and_saves_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("snapshot.json");

        let db = load_or_seed(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db, seed_defaults());
    }

    #[test]
    fn corrupt_snapshot_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_or_seed(&path), Err(StoreError::Json(_))));
    }
}
