//! Student entity
//!
//! A student carries informational profile attributes and three lifecycle
//! dates. The dates are only ever changed through the lifecycle rules or an
//! explicit [`StudentPatch`]; whether a student is active is always derived
//! from them and never stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::StudentId;

use crate::error::ValidationError;
use crate::lifecycle;

/// Informational profile attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StudentProfile {
    /// Full name
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Two-letter state or region code
    pub state: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

impl StudentProfile {
    /// Creates a profile with only the required name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            city: None,
            state: None,
            phone: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Checks the profile's field constraints
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate().map_err(ValidationError::from)
    }
}

/// Where a student currently sits in the enrollment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Never enrolled and never disenrolled
    Unenrolled,
    /// Inside a valid enrollment window
    Active,
    /// Enrolled and not disenrolled, but the window has run out; the next
    /// delinquency evaluation either extends it or disenrolls the student
    Lapsed,
    /// Disenrolled, manually or for non-payment
    Disenrolled,
}

/// A student that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub profile: StudentProfile,
    pub enrolled_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub disenrolled_on: Option<NaiveDate>,
}

impl NewStudent {
    /// Profile only, all lifecycle dates unset
    pub fn new(profile: StudentProfile) -> Self {
        Self {
            profile,
            enrolled_on: None,
            due_on: None,
            disenrolled_on: None,
        }
    }

    /// Creates the student already enrolled on the given date
    pub fn enrolled_on(mut self, date: NaiveDate) -> Self {
        self.enrolled_on = Some(date);
        self.due_on = Some(lifecycle::window_end(date));
        self.disenrolled_on = None;
        self
    }
}

/// A persisted student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub enrolled_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub disenrolled_on: Option<NaiveDate>,
}

impl Student {
    /// Creates a student with profile fields only
    ///
    /// No date invariants are checked here; any combination of lifecycle
    /// dates can be assigned afterwards.
    pub fn new(id: StudentId, profile: StudentProfile) -> Self {
        Self {
            id,
            profile,
            enrolled_on: None,
            due_on: None,
            disenrolled_on: None,
        }
    }

    /// Materializes a new student under its assigned id
    pub fn from_new(id: StudentId, new: NewStudent) -> Self {
        Self {
            id,
            profile: new.profile,
            enrolled_on: new.enrolled_on,
            due_on: new.due_on,
            disenrolled_on: new.disenrolled_on,
        }
    }

    /// Returns true if the student is active on `today`
    pub fn is_active(&self, today: NaiveDate) -> bool {
        lifecycle::is_active(self, today)
    }

    /// Returns the derived lifecycle state on `today`
    pub fn state(&self, today: NaiveDate) -> LifecycleState {
        lifecycle::state(self, today)
    }
}

/// Partial update of a student
///
/// `None` leaves a field untouched. Lifecycle dates are tri-state:
/// `Some(None)` clears the date, `Some(Some(d))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub enrolled_on: Option<Option<NaiveDate>>,
    pub disenrolled_on: Option<Option<NaiveDate>>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        *self == StudentPatch::default()
    }

    /// Applies the patch field by field
    ///
    /// Setting `enrolled_on` reopens the enrollment window from that date;
    /// clearing it also clears `due_on`. `disenrolled_on` is applied last, so a
    /// patch carrying both dates leaves the student disenrolled. The student is
    /// left untouched when validation fails.
    pub fn apply(&self, student: &mut Student) -> Result<(), ValidationError> {
        let mut profile = student.profile.clone();
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(address) = &self.address {
            profile.address = Some(address.clone());
        }
        if let Some(city) = &self.city {
            profile.city = Some(city.clone());
        }
        if let Some(state) = &self.state {
            profile.state = Some(state.clone());
        }
        if let Some(phone) = &self.phone {
            profile.phone = Some(phone.clone());
        }
        profile.check()?;
        student.profile = profile;

        match self.enrolled_on {
            Some(Some(date)) => {
                student.enrolled_on = Some(date);
                student.due_on = Some(lifecycle::window_end(date));
                student.disenrolled_on = None;
            }
            Some(None) => {
                student.enrolled_on = None;
                student.due_on = None;
            }
            None => {}
        }

        if let Some(disenrolled_on) = self.disenrolled_on {
            student.disenrolled_on = disenrolled_on;
        }

        Ok(())
    }
}
