//! Static catalog of the supported Salesforce entities
//!
//! Every entity is keyed by `Id`; the remaining fields are listed in the
//! order the query builder selects them.

use super::types::{FieldSpec, TableSchema};
use crate::config::ConnectionConfig;
use crate::types::FieldType;

/// Entity names in catalog order
pub const TABLES: [&str; 3] = ["Contact", "Opportunity", "Lead"];

/// Field carrying the last modification timestamp
pub const LAST_MODIFIED_FIELD: &str = "LastModifiedDate";

/// Field carrying the creation timestamp
pub const CREATED_FIELD: &str = "CreatedDate";

/// Primary key field shared by all entities
pub const PRIMARY_KEY_FIELD: &str = "Id";

/// (name, type, nullable)
pub type FieldRow = (&'static str, FieldType, bool);

const CONTACT_FIELDS: &[FieldRow] = &[
    ("AccountId", FieldType::String, false),
    ("AssistantName", FieldType::String, true),
    ("AssistantPhone", FieldType::String, true),
    ("Birthdate", FieldType::String, true),
    ("CleanStatus", FieldType::String, true),
    ("Department", FieldType::String, true),
    ("Description", FieldType::String, true),
    ("Email", FieldType::String, true),
    ("EmailBouncedDate", FieldType::String, true),
    ("EmailBouncedReason", FieldType::String, true),
    ("Fax", FieldType::String, true),
    ("FirstName", FieldType::String, true),
    ("HomePhone", FieldType::String, true),
    ("IndividualId", FieldType::String, true),
    ("IsDeleted", FieldType::Boolean, true),
    ("IsEmailBounced", FieldType::Boolean, true),
    ("Jigsaw", FieldType::String, true),
    ("Languages__c", FieldType::String, true),
    ("LastActivityDate", FieldType::String, true),
    ("LastName", FieldType::String, false),
    ("LastReferencedDate", FieldType::String, true),
    ("LastViewedDate", FieldType::String, true),
    ("LeadSource", FieldType::String, true),
    ("MailingCity", FieldType::String, true),
    ("MailingCountry", FieldType::String, true),
    ("MailingGeocodeAccuracy", FieldType::String, true),
    ("MailingLatitude", FieldType::String, true),
    ("MailingLongitude", FieldType::String, true),
    ("MailingPostalCode", FieldType::Number, true),
    ("MailingState", FieldType::String, true),
    ("MailingStreet", FieldType::String, true),
    ("MasterRecordId", FieldType::String, true),
    ("MobilePhone", FieldType::String, true),
    ("Name", FieldType::String, true),
    ("OtherCity", FieldType::String, true),
    ("OtherCountry", FieldType::String, true),
    ("OtherGeocodeAccuracy", FieldType::String, true),
    ("OtherLatitude", FieldType::String, true),
    ("OtherLongitude", FieldType::String, true),
    ("OtherPhone", FieldType::String, true),
    ("OtherPostalCode", FieldType::String, true),
    ("OtherState", FieldType::String, true),
    ("OtherStreet", FieldType::String, true),
    ("OwnerId", FieldType::String, true),
    ("Phone", FieldType::String, true),
    ("PhotoUrl", FieldType::String, true),
    ("RecordTypeId", FieldType::String, true),
    ("ReportsToId", FieldType::String, true),
    ("Salutation", FieldType::String, false),
    ("Title", FieldType::String, true),
    ("LastModifiedById", FieldType::String, true),
    ("LastModifiedDate", FieldType::String, true),
    ("CreatedDate", FieldType::String, true),
];

const OPPORTUNITY_FIELDS: &[FieldRow] = &[
    ("AccountId", FieldType::String, false),
    ("Amount", FieldType::String, true),
    ("CampaignId", FieldType::String, true),
    ("CloseDate", FieldType::String, false),
    ("ContactId", FieldType::String, true),
    ("Description", FieldType::String, true),
    ("ExpectedRevenue", FieldType::String, true),
    ("Fiscal", FieldType::String, true),
    ("FiscalQuarter", FieldType::Number, true),
    ("FiscalYear", FieldType::Number, true),
    ("ForecastCategory", FieldType::String, true),
    ("ForecastCategoryName", FieldType::String, true),
    ("HasOpenActivity", FieldType::Boolean, true),
    ("HasOpportunityLineItem", FieldType::Boolean, true),
    ("HasOverdueTask", FieldType::Boolean, true),
    ("IsClosed", FieldType::Boolean, true),
    ("IsDeleted", FieldType::Boolean, true),
    ("IsWon", FieldType::Boolean, true),
    ("LastActivityDate", FieldType::String, true),
    ("LastAmountChangedHistoryId", FieldType::String, true),
    ("LastCloseDateChangedHistoryId", FieldType::String, true),
    ("LastReferencedDate", FieldType::String, true),
    ("LastStageChangeDate", FieldType::String, true),
    ("LastViewedDate", FieldType::String, true),
    ("LeadSource", FieldType::String, true),
    ("Name", FieldType::String, false),
    ("NextStep", FieldType::String, true),
    ("OwnerId", FieldType::String, true),
    ("Pricebook2Id", FieldType::String, true),
    ("PushCount", FieldType::String, true),
    ("RecordTypeId", FieldType::String, true),
    ("StageName", FieldType::String, false),
    ("TotalOpportunityQuantity", FieldType::String, true),
    ("Type", FieldType::String, true),
    ("LastModifiedById", FieldType::String, true),
    ("LastModifiedDate", FieldType::String, true),
    ("CreatedDate", FieldType::String, true),
];

const LEAD_FIELDS: &[FieldRow] = &[
    ("AnnualRevenue", FieldType::String, false),
    ("City", FieldType::String, true),
    ("CleanStatus", FieldType::String, true),
    ("Company", FieldType::String, false),
    ("CompanyDunsNumber", FieldType::String, true),
    ("ConvertedAccountId", FieldType::String, true),
    ("ConvertedContactId", FieldType::String, true),
    ("ConvertedDate", FieldType::String, true),
    ("ConvertedOpportunityId", FieldType::String, true),
    ("Country", FieldType::String, true),
    ("Description", FieldType::String, true),
    ("Email", FieldType::String, true),
    ("EmailBouncedDate", FieldType::String, true),
    ("EmailBouncedReason", FieldType::String, true),
    ("Fax", FieldType::String, true),
    ("FirstName", FieldType::String, true),
    ("GeocodeAccuracy", FieldType::String, true),
    ("IndividualId", FieldType::String, true),
    ("Industry", FieldType::String, true),
    ("IsConverted", FieldType::Boolean, true),
    ("IsDeleted", FieldType::Boolean, true),
    ("IsUnreadByOwner", FieldType::Boolean, true),
    ("Jigsaw", FieldType::String, true),
    ("LastActivityDate", FieldType::String, true),
    ("LastName", FieldType::String, true),
    ("LastReferencedDate", FieldType::String, true),
    ("Latitude", FieldType::String, true),
    ("Longitude", FieldType::String, true),
    ("LeadSource", FieldType::String, true),
    ("MasterRecordId", FieldType::String, true),
    ("MobilePhone", FieldType::String, true),
    ("Name", FieldType::String, false),
    ("NumberOfEmployees", FieldType::String, true),
    ("PhotoUrl", FieldType::String, true),
    ("PostalCode", FieldType::String, true),
    ("RecordTypeId", FieldType::String, true),
    ("Salutation", FieldType::String, false),
    ("State", FieldType::String, true),
    ("Status", FieldType::String, false),
    ("Street", FieldType::String, true),
    ("Title", FieldType::String, true),
    ("Website", FieldType::String, true),
    ("LastModifiedById", FieldType::String, true),
    ("LastModifiedDate", FieldType::String, true),
    ("CreatedDate", FieldType::String, true),
];

/// Non-key fields of an entity, in selection order
pub fn fields_of(table: &str) -> Option<&'static [FieldRow]> {
    match table {
        "Contact" => Some(CONTACT_FIELDS),
        "Opportunity" => Some(OPPORTUNITY_FIELDS),
        "Lead" => Some(LEAD_FIELDS),
        _ => None,
    }
}

/// Whether the catalog describes this entity
pub fn is_known_table(table: &str) -> bool {
    fields_of(table).is_some()
}

/// Build the schema of a single entity
pub fn table_schema(table: &str) -> Option<TableSchema> {
    let fields = fields_of(table)?;
    let schema = fields.iter().fold(
        TableSchema::new(table)
            .with_field(PRIMARY_KEY_FIELD, FieldSpec::primary_key(FieldType::String, 1)),
        |schema, (name, field_type, nullable)| {
            schema.with_field(*name, FieldSpec::new(*field_type, *nullable))
        },
    );
    Some(schema)
}

/// Describe every supported entity
///
/// The catalog is static; the connection config is accepted so hosts can
/// call this the same way as the other entry points.
pub fn discover_schema(_connection: &ConnectionConfig) -> Vec<TableSchema> {
    TABLES.iter().filter_map(|t| table_schema(t)).collect()
}
