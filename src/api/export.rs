//! CSV exports
//!
//! Admin downloads of the entry ledger. Amounts and timestamps use the German
//! display format, the same one the admin listings show.

use csv::Writer;

use crate::domain::{format_euro, format_german, format_timestamp, SurveyEntry};
use crate::error::{AppError, AppResult};

pub const ALL_ENTRIES_FILENAME: &str = "umfrage_alle_eintraege.csv";
pub const CONTACTS_FILENAME: &str = "umfrage_kontaktdaten.csv";

/// Placeholder for missing contact fields in the full export
const MISSING: &str = "-";

const ALL_ENTRIES_HEADER: [&str; 7] = [
    "ID",
    "Volumen (€)",
    "Name",
    "Firma",
    "E-Mail",
    "Telefon",
    "Zeitpunkt",
];

const CONTACTS_HEADER: [&str; 7] = [
    "ID",
    "Name",
    "Firma",
    "E-Mail",
    "Telefon",
    "Volumen (verknüpft)",
    "Zeitpunkt",
];

/// Every entry, with `-` for contact fields that were never given
pub fn all_entries_csv(entries: &[SurveyEntry]) -> AppResult<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(ALL_ENTRIES_HEADER).map_err(csv_error)?;

    for entry in entries {
        let contact = &entry.contact;
        writer
            .write_record([
                entry.id.to_string().as_str(),
                format_german(entry.amount).as_str(),
                contact.name.as_deref().unwrap_or(MISSING),
                contact.company.as_deref().unwrap_or(MISSING),
                contact.email.as_deref().unwrap_or(MISSING),
                contact.phone.as_deref().unwrap_or(MISSING),
                format_timestamp(&entry.created_at).as_str(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// Entries that carry contact details, with the amount they were linked to
pub fn contacts_csv(entries: &[SurveyEntry]) -> AppResult<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(CONTACTS_HEADER).map_err(csv_error)?;

    for entry in entries.iter().filter(|e| e.has_contact) {
        let contact = &entry.contact;
        writer
            .write_record([
                entry.id.to_string().as_str(),
                contact.name.as_deref().unwrap_or_default(),
                contact.company.as_deref().unwrap_or_default(),
                contact.email.as_deref().unwrap_or_default(),
                contact.phone.as_deref().unwrap_or_default(),
                format_euro(entry.amount).as_str(),
                format_timestamp(&entry.created_at).as_str(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

fn finish(writer: Writer<Vec<u8>>) -> AppResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}

fn csv_error(err: csv::Error) -> AppError {
    AppError::Internal(format!("CSV export failed: {}", err))
}
