//! gRPC client for the patient registration service
//!
//! The message types are declared with prost derives and the unary call is
//! issued through `tonic::client::Grpc`, so no code generation step is needed.

use super::traits::RegistrationService;
use crate::state::forms::RegistrationPayload;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};

/// Wire messages for `intake.v1.Registration`
pub mod proto {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct IdentificationDocument {
        #[prost(string, tag = "1")]
        pub file_name: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub mime_type: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "3")]
        pub content: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RegisterPatientRequest {
        #[prost(string, tag = "1")]
        pub submission_id: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub user_id: ::prost::alloc::string::String,
        #[prost(string, tag = "3")]
        pub name: ::prost::alloc::string::String,
        #[prost(string, tag = "4")]
        pub email: ::prost::alloc::string::String,
        #[prost(string, tag = "5")]
        pub phone: ::prost::alloc::string::String,
        /// ISO 8601 calendar date, empty when unknown
        #[prost(string, tag = "6")]
        pub birth_date: ::prost::alloc::string::String,
        #[prost(string, tag = "7")]
        pub gender: ::prost::alloc::string::String,
        #[prost(string, tag = "8")]
        pub address: ::prost::alloc::string::String,
        #[prost(string, tag = "9")]
        pub occupation: ::prost::alloc::string::String,
        #[prost(string, tag = "10")]
        pub emergency_contact_name: ::prost::alloc::string::String,
        #[prost(string, tag = "11")]
        pub emergency_contact_number: ::prost::alloc::string::String,
        #[prost(string, tag = "12")]
        pub primary_physician: ::prost::alloc::string::String,
        #[prost(string, tag = "13")]
        pub insurance_provider: ::prost::alloc::string::String,
        #[prost(string, tag = "14")]
        pub insurance_policy_number: ::prost::alloc::string::String,
        #[prost(string, tag = "15")]
        pub allergies: ::prost::alloc::string::String,
        #[prost(string, tag = "16")]
        pub current_medications: ::prost::alloc::string::String,
        #[prost(string, tag = "17")]
        pub family_medical_history: ::prost::alloc::string::String,
        #[prost(string, tag = "18")]
        pub past_medical_history: ::prost::alloc::string::String,
        #[prost(string, tag = "19")]
        pub identification_type: ::prost::alloc::string::String,
        #[prost(string, tag = "20")]
        pub identification_number: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "21")]
        pub identification_document: ::core::option::Option<IdentificationDocument>,
        #[prost(bool, tag = "22")]
        pub treatment_consent: bool,
        #[prost(bool, tag = "23")]
        pub disclosure_consent: bool,
        #[prost(bool, tag = "24")]
        pub privacy_consent: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RegisterPatientResponse {
        #[prost(string, tag = "1")]
        pub patient_id: ::prost::alloc::string::String,
    }
}

const REGISTER_PATIENT_PATH: &str = "/intake.v1.Registration/RegisterPatient";

/// Client for the patient registration service
#[derive(Clone)]
pub struct RegistrationClient {
    grpc: tonic::client::Grpc<Channel>,
    address: String,
}

impl RegistrationClient {
    /// Create a client for `address`. The connection is opened on first use,
    /// so an unreachable service surfaces as a failed registration.
    pub fn new(address: &str) -> Result<Self> {
        let channel = Endpoint::from_shared(address.to_string())
            .with_context(|| format!("Invalid registration service address: {address}"))?
            .connect_lazy();
        Ok(Self {
            grpc: tonic::client::Grpc::new(channel),
            address: address.to_string(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Build the wire request for a payload
fn to_request(payload: RegistrationPayload) -> proto::RegisterPatientRequest {
    proto::RegisterPatientRequest {
        submission_id: payload.submission_id.to_string(),
        user_id: payload.user_id.unwrap_or_default(),
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        birth_date: payload
            .birth_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        gender: payload.gender,
        address: payload.address,
        occupation: payload.occupation,
        emergency_contact_name: payload.emergency_contact_name,
        emergency_contact_number: payload.emergency_contact_number,
        primary_physician: payload.primary_physician,
        insurance_provider: payload.insurance_provider,
        insurance_policy_number: payload.insurance_policy_number,
        allergies: payload.allergies,
        current_medications: payload.current_medications,
        family_medical_history: payload.family_medical_history,
        past_medical_history: payload.past_medical_history,
        identification_type: payload.identification_type,
        identification_number: payload.identification_number,
        identification_document: payload.identification_document.map(|doc| {
            proto::IdentificationDocument {
                file_name: doc.file_name,
                mime_type: doc.mime_type,
                content: doc.content,
            }
        }),
        treatment_consent: payload.treatment_consent,
        disclosure_consent: payload.disclosure_consent,
        privacy_consent: payload.privacy_consent,
    }
}

/// Extract the created record id; an empty id counts as a failure
fn created_id(response: proto::RegisterPatientResponse) -> Result<String> {
    if response.patient_id.trim().is_empty() {
        return Err(anyhow!("Registration service returned no patient id"));
    }
    Ok(response.patient_id)
}

#[async_trait]
impl RegistrationService for RegistrationClient {
    async fn register_patient(&self, payload: RegistrationPayload) -> Result<String> {
        let mut grpc = self.grpc.clone();
        grpc.ready()
            .await
            .map_err(|e| anyhow!("Registration service is not ready: {}", e))?;

        let request = tonic::Request::new(to_request(payload));
        let response = grpc
            .unary(
                request,
                PathAndQuery::from_static(REGISTER_PATIENT_PATH),
                tonic::codec::ProstCodec::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to register patient: {}", e.message()))?;

        created_id(response.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::Attachment;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn payload() -> RegistrationPayload {
        RegistrationPayload {
            submission_id: Uuid::nil(),
            user_id: None,
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+15551234567".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 14),
            gender: "Female".to_string(),
            address: "14th Street, New York".to_string(),
            occupation: "Engineer".to_string(),
            emergency_contact_name: "John Doe".to_string(),
            emergency_contact_number: "+15557654321".to_string(),
            primary_physician: "Jane Powell".to_string(),
            insurance_provider: "BlueCross".to_string(),
            insurance_policy_number: "ABC123456789".to_string(),
            allergies: String::new(),
            current_medications: String::new(),
            family_medical_history: String::new(),
            past_medical_history: String::new(),
            identification_type: "Passport".to_string(),
            identification_number: "X123".to_string(),
            identification_document: None,
            treatment_consent: true,
            disclosure_consent: true,
            privacy_consent: true,
        }
    }

    #[test]
    fn test_to_request_maps_fields() {
        let request = to_request(payload());
        assert_eq!(request.submission_id, Uuid::nil().to_string());
        assert_eq!(request.user_id, "");
        assert_eq!(request.birth_date, "1990-03-14");
        assert_eq!(request.primary_physician, "Jane Powell");
        assert!(request.identification_document.is_none());
        assert!(request.treatment_consent);
    }

    #[test]
    fn test_to_request_includes_document() {
        let mut payload = payload();
        payload.user_id = Some("user-1".to_string());
        payload.identification_document =
            Some(Attachment::new("id.png", "image/png", vec![7, 8]));
        let request = to_request(payload);
        assert_eq!(request.user_id, "user-1");
        assert_eq!(
            request.identification_document,
            Some(proto::IdentificationDocument {
                file_name: "id.png".to_string(),
                mime_type: "image/png".to_string(),
                content: vec![7, 8],
            })
        );
    }

    #[test]
    fn test_created_id_rejects_empty() {
        let ok = created_id(proto::RegisterPatientResponse {
            patient_id: "p-1".to_string(),
        });
        assert_eq!(ok.unwrap(), "p-1");
        let empty = created_id(proto::RegisterPatientResponse {
            patient_id: "  ".to_string(),
        });
        assert!(empty.is_err());
    }

    #[test]
    fn test_new_rejects_invalid_address() {
        let result = RegistrationClient::new("not a uri");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_service_fails() {
        let client = RegistrationClient::new("http://127.0.0.1:1").unwrap();
        assert_eq!(client.address(), "http://127.0.0.1:1");
        let result = client.register_patient(payload()).await;
        assert!(result.is_err());
    }
}
