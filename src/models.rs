use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado",
];

pub const WEEKDAY_NAMES_SHORT: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
    "Outubro", "Novembro", "Dezembro",
];

/// Icon shown next to a service in the picker. Fixed set, stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceIcon {
    Cut,
    Beard,
    Shave,
    Razor,
}

impl ServiceIcon {
    pub const ALL: [ServiceIcon; 4] = [
        ServiceIcon::Cut,
        ServiceIcon::Beard,
        ServiceIcon::Shave,
        ServiceIcon::Razor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceIcon::Cut => "cut",
            ServiceIcon::Beard => "beard",
            ServiceIcon::Shave => "shave",
            ServiceIcon::Razor => "razor",
        }
    }

    pub fn parse(value: &str) -> Option<ServiceIcon> {
        ServiceIcon::ALL
            .into_iter()
            .find(|icon| icon.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceIcon::Cut => "Tesoura",
            ServiceIcon::Beard => "Barba",
            ServiceIcon::Shave => "Máquina",
            ServiceIcon::Razor => "Navalha",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub price: f64,
    /// Duration in minutes.
    pub duration: u32,
    pub icon: ServiceIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barber {
    pub id: i64,
    pub name: String,
    pub image_url: String,
}

/// Operating hours for one weekday. `day_of_week` runs 0=Sunday..6=Saturday.
/// Hour fields are whole hours, 0-23; the admin form is the only place that
/// validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub day_of_week: u8,
    pub is_open: bool,
    pub opening: u32,
    pub closing: u32,
    pub lunch_start: u32,
    pub lunch_end: u32,
}

/// A booked appointment. `service` and `barber` are copies taken at booking
/// time: later edits or deletions of the catalog never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub service: Service,
    pub barber: Barber,
    pub date: NaiveDateTime,
    pub customer_name: String,
    pub customer_phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    pub instagram: String,
    pub facebook: String,
    pub whatsapp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub logo_name: String,
    pub about_text: String,
    pub footer_address: String,
    pub footer_phone: String,
    pub footer_email: String,
    pub social_links: SocialLinks,
}
