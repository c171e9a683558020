//! Workflow status enums.
//!
//! Stored as their SCREAMING_SNAKE_CASE names in VARCHAR(20) columns and
//! serialized the same way on the wire.

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            serde::Serialize,
            serde::Deserialize,
            strum::Display,
            strum::EnumString,
            strum::AsRefStr,
            utoipa::ToSchema,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $variant ),+
        }
    };
}

define_status_enum! {
    /// Attendance outcome for one employee on one day.
    AttendanceStatus {
        Present,
        Absent,
        Late,
        HalfDay,
        OnLeave,
    }
}

define_status_enum! {
    /// Payment state of a purchase order.
    PaymentStatus {
        Pending,
        Partial,
        Paid,
        Cancelled,
    }
}

define_status_enum! {
    /// Invoice lifecycle. `Pending` invoices wait for approval.
    InvoiceStatus {
        Draft,
        Pending,
        Approved,
        Paid,
        Cancelled,
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_representation_matches_wire() {
        assert_eq!(AttendanceStatus::HalfDay.as_ref(), "HALF_DAY");
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::HalfDay).unwrap(),
            "\"HALF_DAY\""
        );
        assert_eq!("ON_LEAVE".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::OnLeave);
    }

    #[test]
    fn defaults() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Draft);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("SHIPPED".parse::<PaymentStatus>().is_err());
        assert!(serde_json::from_str::<InvoiceStatus>("\"approved\"").is_err());
    }
}
