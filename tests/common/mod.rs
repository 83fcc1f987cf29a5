#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use gemba_core::application::ports::{
    AccessToken, AuthProvider, ConnectivityProbe, PendingStore, RecordGateway, ReferenceGateway,
    TourGateway,
};
use gemba_core::application::services::{
    InspectionService, ModeController, SessionBootstrapper, Synchronizer,
};
use gemba_core::domain::entities::{
    Criterion, EmployeeDetails, PendingRecord, RemoteObservation, Tour,
};
use gemba_core::domain::value_objects::{NaturalKey, RecordCategory, RemoteId, TourId};
use gemba_core::infrastructure::storage::SqlitePendingStore;
use gemba_core::shared::AppError;
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockConnectivity {
    online: AtomicBool,
}

impl MockConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

#[async_trait]
impl ConnectivityProbe for MockConnectivity {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}

pub struct MockAuth {
    fail: AtomicBool,
}

impl MockAuth {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn access_token(&self) -> Result<AccessToken, AppError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(AppError::Auth("please sign in again".into()));
        }
        Ok(AccessToken {
            token: "test-token".into(),
            expires_at: Utc::now().timestamp() + 3600,
        })
    }

    async fn refresh(&self) -> Result<AccessToken, AppError> {
        self.access_token().await
    }
}

pub struct MockTourGateway {
    tour_id: String,
    pub finished: Mutex<Vec<Option<f64>>>,
}

impl MockTourGateway {
    pub fn new(tour_id: &str) -> Self {
        Self {
            tour_id: tour_id.to_string(),
            finished: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TourGateway for MockTourGateway {
    async fn create_or_resume(&self, plant: &str, department: &str) -> Result<Tour, AppError> {
        Ok(Tour::new(
            TourId::new(self.tour_id.clone()).unwrap(),
            plant.to_string(),
            department.to_string(),
            Utc::now(),
        ))
    }

    async fn finish(&self, _tour_id: &TourId, score: Option<f64>) -> Result<(), AppError> {
        self.finished.lock().unwrap().push(score);
        Ok(())
    }
}

pub struct MockReferenceGateway {
    pub criteria: Vec<Criterion>,
    pub observations: Vec<RemoteObservation>,
    fail_criteria: AtomicBool,
}

impl MockReferenceGateway {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self {
            criteria,
            observations: Vec::new(),
            fail_criteria: AtomicBool::new(false),
        }
    }

    pub fn set_criteria_failing(&self, fail: bool) {
        self.fail_criteria.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl ReferenceGateway for MockReferenceGateway {
    async fn resolve_employee(&self, user_id: &str) -> Result<EmployeeDetails, AppError> {
        Ok(EmployeeDetails {
            employee_id: user_id.to_string(),
            name: "Test Inspector".into(),
            role: "QA".into(),
            plant: "P01".into(),
            department: "Sandwich Line".into(),
        })
    }

    async fn list_criteria(
        &self,
        _plant: &str,
        _department: &str,
    ) -> Result<Vec<Criterion>, AppError> {
        if self.fail_criteria.load(Ordering::Relaxed) {
            return Err(AppError::Network("criteria endpoint unreachable".into()));
        }
        Ok(self.criteria.clone())
    }

    async fn list_observations(
        &self,
        _tour_id: &TourId,
    ) -> Result<Vec<RemoteObservation>, AppError> {
        Ok(self.observations.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Validation,
}

/// In-memory stand-in for one category's remote endpoint. Honors the
/// update-if-exists contract so duplicate sends land on the same row.
/// Categories that share a remote resource (checklist and not-applicable
/// observations) share a row map.
pub struct MockRecordGateway {
    category: RecordCategory,
    counter: AtomicU32,
    remote_rows: Arc<Mutex<HashMap<String, RemoteId>>>,
    pub creates: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<String>>,
    pub fail_keys: Mutex<HashMap<String, FailureKind>>,
}

impl MockRecordGateway {
    pub fn new(category: RecordCategory) -> Self {
        Self::with_rows(category, Arc::new(Mutex::new(HashMap::new())))
    }

    pub fn with_rows(
        category: RecordCategory,
        remote_rows: Arc<Mutex<HashMap<String, RemoteId>>>,
    ) -> Self {
        Self {
            category,
            counter: AtomicU32::new(0),
            remote_rows,
            creates: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            fail_keys: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail_on(&self, natural_key: &str, kind: FailureKind) {
        self.fail_keys
            .lock()
            .unwrap()
            .insert(natural_key.to_string(), kind);
    }

    pub fn clear_failures(&self) {
        self.fail_keys.lock().unwrap().clear();
    }

    pub fn send_count(&self) -> usize {
        self.creates.lock().unwrap().len() + self.updates.lock().unwrap().len()
    }

    pub fn remote_row_count(&self) -> usize {
        self.remote_rows.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordGateway for MockRecordGateway {
    fn category(&self) -> RecordCategory {
        self.category
    }

    async fn send(&self, record: &PendingRecord) -> Result<RemoteId, AppError> {
        let key = record.natural_key.as_str().to_string();
        if let Some(kind) = self.fail_keys.lock().unwrap().get(&key) {
            return Err(match kind {
                FailureKind::Network => AppError::Network("simulated outage".into()),
                FailureKind::Validation => AppError::RemoteRejection {
                    status: 422,
                    message: "simulated validation failure".into(),
                },
            });
        }

        let mut rows = self.remote_rows.lock().unwrap();
        if let Some(existing) = rows.get(&key) {
            self.updates.lock().unwrap().push(key);
            return Ok(existing.clone());
        }
        let id = RemoteId::new(format!(
            "{}-{}",
            self.category,
            self.counter.fetch_add(1, Ordering::Relaxed)
        ))
        .unwrap();
        rows.insert(key.clone(), id.clone());
        self.creates.lock().unwrap().push(key);
        Ok(id)
    }

    async fn query(
        &self,
        _tour_id: &TourId,
        natural_key: &NaturalKey,
    ) -> Result<Option<RemoteId>, AppError> {
        Ok(self
            .remote_rows
            .lock()
            .unwrap()
            .get(natural_key.as_str())
            .cloned())
    }

    async fn delete(&self, remote_id: &RemoteId) -> Result<(), AppError> {
        self.remote_rows
            .lock()
            .unwrap()
            .retain(|_, id| id != remote_id);
        Ok(())
    }
}

pub fn sample_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            id: "c-1".into(),
            area: "Mixing".into(),
            category: "Hygiene".into(),
            what_text: "Floors".into(),
            criteria_text: "Free of debris".into(),
        },
        Criterion {
            id: "c-2".into(),
            area: "Packing".into(),
            category: "Safety".into(),
            what_text: "Guards".into(),
            criteria_text: "In place".into(),
        },
    ]
}

/// Full service wiring over an in-memory store and mock collaborators.
pub struct Harness {
    pub service: Arc<InspectionService>,
    pub mode: Arc<ModeController>,
    pub store: Arc<dyn PendingStore>,
    pub connectivity: Arc<MockConnectivity>,
    pub auth: Arc<MockAuth>,
    pub reference: Arc<MockReferenceGateway>,
    pub tours: Arc<MockTourGateway>,
    pub record_gateways: HashMap<RecordCategory, Arc<MockRecordGateway>>,
}

impl Harness {
    pub async fn new() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let store: Arc<dyn PendingStore> = Arc::new(SqlitePendingStore::new(pool, 30));

        let connectivity = Arc::new(MockConnectivity::new(true));
        let auth = Arc::new(MockAuth::new());
        let reference = Arc::new(MockReferenceGateway::new(sample_criteria()));
        let tours = Arc::new(MockTourGateway::new("t-1"));

        // Both observation categories target the same remote resource.
        let observation_rows = Arc::new(Mutex::new(HashMap::new()));
        let mut record_gateways = HashMap::new();
        let mut dyn_gateways: Vec<Arc<dyn RecordGateway>> = Vec::new();
        for category in RecordCategory::ALL {
            let gateway = match category {
                RecordCategory::ChecklistObservation
                | RecordCategory::NotApplicableObservation => Arc::new(
                    MockRecordGateway::with_rows(category, observation_rows.clone()),
                ),
                _ => Arc::new(MockRecordGateway::new(category)),
            };
            record_gateways.insert(category, gateway.clone());
            dyn_gateways.push(gateway);
        }

        let mode = Arc::new(ModeController::new());
        let synchronizer = Arc::new(Synchronizer::new(store.clone(), dyn_gateways.clone()));
        let bootstrapper = Arc::new(SessionBootstrapper::new(
            auth.clone(),
            tours.clone(),
            reference.clone(),
            store.clone(),
            connectivity.clone(),
            mode.clone(),
        ));
        let service = Arc::new(InspectionService::new(
            store.clone(),
            mode.clone(),
            synchronizer,
            bootstrapper,
            tours.clone(),
            reference.clone(),
            dyn_gateways,
            24,
        ));

        Self {
            service,
            mode,
            store,
            connectivity,
            auth,
            reference,
            tours,
            record_gateways,
        }
    }

    pub fn gateway(&self, category: RecordCategory) -> &MockRecordGateway {
        self.record_gateways.get(&category).unwrap()
    }
}
