use batho_pele::auth::Authenticator;
use batho_pele::config::{AuthConfig, IntakeConfig};
use batho_pele::workflows::intake::{
    CsvVerificationSource, HomeAffairsReferral, IntakeRecord, IntakeRepository, IntakeService,
    PatientId, ReferralError, ReferralPublisher, RepositoryError, VerificationError,
    VerificationSource, VerificationTable,
};
use batho_pele::workflows::treatment::TreatmentCatalog;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) authenticator: Arc<Authenticator>,
    pub(crate) trust_forwarded_for: bool,
    pub(crate) catalog: Arc<TreatmentCatalog>,
}

impl AppState {
    pub(crate) fn new(metrics: PrometheusHandle, auth: &AuthConfig) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
            authenticator: Arc::new(auth.authenticator()),
            trust_forwarded_for: auth.trust_forwarded_for,
            catalog: Arc::new(TreatmentCatalog::standard()),
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryIntakeRepository {
    records: Arc<Mutex<HashMap<PatientId, IntakeRecord>>>,
}

impl InMemoryIntakeRepository {
    fn records(&self) -> Result<MutexGuard<'_, HashMap<PatientId, IntakeRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("intake store lock poisoned".to_string()))
    }
}

impl IntakeRepository for InMemoryIntakeRepository {
    fn insert(&self, record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&record.patient_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.patient_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: IntakeRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&record.patient_id) {
            guard.insert(record.patient_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &PatientId) -> Result<Option<IntakeRecord>, RepositoryError> {
        Ok(self.records()?.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
        Ok(self.records()?.values().cloned().collect())
    }
}

/// Keeps referrals in memory and logs them for the Home Affairs liaison desk.
#[derive(Default, Clone)]
pub(crate) struct LoggingReferralPublisher {
    events: Arc<Mutex<Vec<HomeAffairsReferral>>>,
}

impl ReferralPublisher for LoggingReferralPublisher {
    fn refer(&self, referral: HomeAffairsReferral) -> Result<(), ReferralError> {
        warn!(
            patient_id = %referral.patient_id,
            nationality = %referral.nationality,
            doc_type = %referral.doc_type,
            "Home Affairs referral queued"
        );
        let mut guard = self
            .events
            .lock()
            .map_err(|_| ReferralError::Transport("referral queue lock poisoned".to_string()))?;
        guard.push(referral);
        Ok(())
    }
}

impl LoggingReferralPublisher {
    pub(crate) fn events(&self) -> Vec<HomeAffairsReferral> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

pub(crate) type ApiIntakeService =
    IntakeService<InMemoryIntakeRepository, LoggingReferralPublisher>;

pub(crate) fn intake_service(verification: Arc<dyn VerificationSource>) -> Arc<ApiIntakeService> {
    Arc::new(IntakeService::new(
        Arc::new(InMemoryIntakeRepository::default()),
        Arc::new(LoggingReferralPublisher::default()),
        verification,
    ))
}

/// Resolve the verification source: a CSV extract when configured, otherwise the sample table.
pub(crate) fn verification_source(
    config: &IntakeConfig,
) -> Result<Arc<dyn VerificationSource>, VerificationError> {
    match &config.verification_table {
        Some(path) => {
            let source = CsvVerificationSource::new(path);
            if source.seed_if_missing()? {
                info!(path = %source.path().display(), "seeded verification table with sample extract");
            }
            Ok(Arc::new(source))
        }
        None => Ok(Arc::new(VerificationTable::sample())),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
