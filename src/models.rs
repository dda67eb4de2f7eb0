use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} value: {value}")]
pub struct InvalidEnumValue {
    kind: &'static str,
    value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
        )]
        #[diesel(sql_type = Text)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(InvalidEnumValue {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                raw.parse::<$name>().map_err(Into::into)
            }
        }
    };
}

text_enum!(Role, "role", {
    Volunteer => "volunteer",
    DeliveryBoy => "delivery_boy",
    Admin => "admin",
});

text_enum!(EventStatus, "event status", {
    Upcoming => "upcoming",
    Completed => "completed",
    Cancelled => "cancelled",
});

text_enum!(RegistrationStatus, "registration status", {
    Registered => "registered",
    Completed => "completed",
});

text_enum!(RequestStatus, "request status", {
    Pending => "pending",
    Assigned => "assigned",
    Completed => "completed",
});

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub vehicle_type: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub vehicle_type: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = events)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub created_by: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = event_registrations)]
#[diesel(belongs_to(User, foreign_key = volunteer_id))]
#[diesel(belongs_to(Event))]
pub struct EventRegistration {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub event_id: Uuid,
    pub status: RegistrationStatus,
    pub registered_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = event_registrations)]
pub struct NewEventRegistration {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub event_id: Uuid,
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = donations)]
pub struct Donation {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub donor_role: String,
    pub amount: f64,
    pub transaction_id: String,
    pub receipt_url: Option<String>,
    pub donated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = donations)]
pub struct NewDonation {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub donor_role: String,
    pub amount: f64,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = recycling_requests)]
pub struct RecyclingRequest {
    pub id: Uuid,
    pub request_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub item_type: String,
    pub pickup_date: NaiveDate,
    pub status: RequestStatus,
    pub assigned_to: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recycling_requests)]
pub struct NewRecyclingRequest {
    pub id: Uuid,
    pub request_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub item_type: String,
    pub pickup_date: NaiveDate,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = contact_messages)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = contact_messages)]
pub struct NewContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = activity_logs)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_logs)]
pub struct NewActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = certificates)]
pub struct NewCertificate {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub event_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub id: Uuid,
    pub assigned_to: Uuid,
    pub assigned_role: Role,
    pub title: String,
    pub status: String,
}
