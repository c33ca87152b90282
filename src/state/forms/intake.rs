//! Patient registration form: field names, option lists and schema

use super::attachment::{AttachmentSet, MAX_DOCUMENT_FILES};
use super::controls::{FileUploader, RadioGroup};
use super::field::{FieldDefinition, FieldValue};
use super::schema::{FormSchema, SchemaError};
use super::session::Prefill;
use super::validation::Rule;
use crate::config::UserProfile;
use chrono::NaiveDate;
use std::sync::Arc;

/// Field names, as sent to the registration service
pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const BIRTH_DATE: &str = "birthDate";
    pub const GENDER: &str = "gender";
    pub const ADDRESS: &str = "address";
    pub const OCCUPATION: &str = "occupation";
    pub const EMERGENCY_CONTACT_NAME: &str = "emergencyContactName";
    pub const EMERGENCY_CONTACT_NUMBER: &str = "emergencyContactNumber";
    pub const PRIMARY_PHYSICIAN: &str = "primaryPhysician";
    pub const INSURANCE_PROVIDER: &str = "insuranceProvider";
    pub const INSURANCE_POLICY_NUMBER: &str = "insurancePolicyNumber";
    pub const ALLERGIES: &str = "allergies";
    pub const CURRENT_MEDICATIONS: &str = "currentMedications";
    pub const FAMILY_MEDICAL_HISTORY: &str = "familyMedicalHistory";
    pub const PAST_MEDICAL_HISTORY: &str = "pastMedicalHistory";
    pub const IDENTIFICATION_TYPE: &str = "identificationType";
    pub const IDENTIFICATION_NUMBER: &str = "identificationNumber";
    pub const IDENTIFICATION_DOCUMENT: &str = "identificationDocument";
    pub const TREATMENT_CONSENT: &str = "treatmentConsent";
    pub const DISCLOSURE_CONSENT: &str = "disclosureConsent";
    pub const PRIVACY_CONSENT: &str = "privacyConsent";
}

pub const GENDER_OPTIONS: &[&str] = &["Male", "Female", "Other"];

pub const PHYSICIANS: &[&str] = &[
    "John Green",
    "Leila Cameron",
    "David Livingston",
    "Evan Peter",
    "Jane Powell",
    "Alex Ramirez",
    "Jasmine Lee",
    "Alyana Cruz",
    "Hardik Sharma",
];

pub const IDENTIFICATION_TYPES: &[&str] = &[
    "Birth Certificate",
    "Driver's License",
    "Medical Insurance Card/Policy",
    "Military ID Card",
    "National Identity Card",
    "Passport",
    "Resident Alien Card (Green Card)",
    "Social Security Card",
    "State ID Card",
    "Student ID Card",
    "Voter ID Card",
];

/// Form sections in display order, each starting at the named field
pub const SECTIONS: &[(&str, &str)] = &[
    ("Personal Information", fields::NAME),
    ("Medical Information", fields::PRIMARY_PHYSICIAN),
    ("Identification and Verification", fields::IDENTIFICATION_TYPE),
    ("Consent and Privacy", fields::TREATMENT_CONSENT),
];

const INVALID_PHONE: &str = "Invalid phone number";

/// Build the patient registration schema. `today` seeds the birth date picker.
pub fn patient_registration_schema(today: NaiveDate) -> Result<FormSchema, SchemaError> {
    use fields::*;

    FormSchema::new(vec![
        // Personal information
        FieldDefinition::text(NAME, "Full name")
            .placeholder("John Doe")
            .required()
            .rule(Rule::min_length(2, "Name must be at least 2 characters"))
            .rule(Rule::max_length(50, "Name must be at most 50 characters")),
        FieldDefinition::text(EMAIL, "Email")
            .placeholder("johndoe@gmail.com")
            .required()
            .rule(Rule::email("Invalid email address")),
        FieldDefinition::phone(PHONE, "Phone number")
            .placeholder("+1 555 123 4567")
            .required()
            .rule(Rule::phone(INVALID_PHONE)),
        FieldDefinition::date(BIRTH_DATE, "Date of Birth", today).required(),
        FieldDefinition::composite(
            GENDER,
            "Gender",
            Arc::new(RadioGroup::new(GENDER_OPTIONS)),
            FieldValue::text(GENDER_OPTIONS[0]),
        )
        .required()
        .rule(Rule::one_of(GENDER_OPTIONS, "Select a gender")),
        FieldDefinition::text(ADDRESS, "Address")
            .placeholder("14th Street, New York")
            .required()
            .rule(Rule::min_length(5, "Address must be at least 5 characters"))
            .rule(Rule::max_length(500, "Address must be at most 500 characters")),
        FieldDefinition::text(OCCUPATION, "Occupation")
            .placeholder("Software Engineer")
            .required()
            .rule(Rule::min_length(2, "Occupation must be at least 2 characters"))
            .rule(Rule::max_length(500, "Occupation must be at most 500 characters")),
        FieldDefinition::text(EMERGENCY_CONTACT_NAME, "Emergency Contact Name")
            .placeholder("Guardian's Name")
            .required()
            .rule(Rule::min_length(2, "Contact name must be at least 2 characters"))
            .rule(Rule::max_length(50, "Contact name must be at most 50 characters")),
        FieldDefinition::phone(EMERGENCY_CONTACT_NUMBER, "Emergency Contact Number")
            .placeholder("+1 555 123 4567")
            .required()
            .rule(Rule::phone(INVALID_PHONE)),
        // Medical information
        FieldDefinition::select(PRIMARY_PHYSICIAN, "Primary Physician", PHYSICIANS)
            .placeholder("Select a physician")
            .required_with("Select at least one doctor")
            .rule(Rule::one_of(PHYSICIANS, "Select at least one doctor")),
        FieldDefinition::text(INSURANCE_PROVIDER, "Insurance Provider")
            .placeholder("BlueCross BlueShield")
            .required()
            .rule(Rule::min_length(2, "Insurance name must be at least 2 characters"))
            .rule(Rule::max_length(50, "Insurance name must be at most 50 characters")),
        FieldDefinition::text(INSURANCE_POLICY_NUMBER, "Insurance Policy Number")
            .placeholder("ABC123456789")
            .required()
            .rule(Rule::min_length(2, "Policy number must be at least 2 characters"))
            .rule(Rule::max_length(50, "Policy number must be at most 50 characters")),
        FieldDefinition::textarea(ALLERGIES, "Allergies (if any)")
            .placeholder("Peanuts, Penicillin, Pollen"),
        FieldDefinition::textarea(CURRENT_MEDICATIONS, "Current Medications")
            .placeholder("Ibuprofen 200mg, Paracetamol 500mg"),
        FieldDefinition::textarea(FAMILY_MEDICAL_HISTORY, "Family Medical History")
            .placeholder("Mother - Diabetes, Father - Hypertension"),
        FieldDefinition::textarea(PAST_MEDICAL_HISTORY, "Past Medical History")
            .placeholder("Appendectomy, Tonsillectomy"),
        // Identification and verification
        FieldDefinition::select(IDENTIFICATION_TYPE, "Identification Type", IDENTIFICATION_TYPES)
            .placeholder("Select an identification type")
            .default_value(FieldValue::text(IDENTIFICATION_TYPES[0])),
        FieldDefinition::text(IDENTIFICATION_NUMBER, "Identification Number")
            .placeholder("1234567890"),
        FieldDefinition::composite(
            IDENTIFICATION_DOCUMENT,
            "Scanned copy of identification document",
            Arc::new(FileUploader),
            FieldValue::Files(AttachmentSet::new(MAX_DOCUMENT_FILES)),
        ),
        // Consent and privacy
        FieldDefinition::checkbox(TREATMENT_CONSENT, "I consent to treatment.")
            .rule(Rule::must_be_true("You must consent to treatment in order to proceed")),
        FieldDefinition::checkbox(DISCLOSURE_CONSENT, "I consent to disclosure of information.")
            .rule(Rule::must_be_true("You must consent to disclosure in order to proceed")),
        FieldDefinition::checkbox(PRIVACY_CONSENT, "I consent to privacy policy.")
            .rule(Rule::must_be_true("You must consent to privacy in order to proceed")),
    ])
}

/// Values to prefill from the configured user profile
pub fn prefill_for(profile: Option<&UserProfile>) -> Prefill {
    let Some(profile) = profile else {
        return Prefill::default();
    };
    let values = [
        (fields::NAME, &profile.name),
        (fields::EMAIL, &profile.email),
        (fields::PHONE, &profile.phone),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.as_ref().map(|v| (name, FieldValue::text(v.clone()))))
    .collect();
    Prefill {
        user_id: Some(profile.id.clone()),
        values,
    }
}
