//! Vehicle HAL service - the dispatcher entry point.
//!
//! Accepts get/set batches from callers, validates them, registers their ids
//! with the pending pool of their kind and forwards the valid requests to
//! hardware. Results come back to the caller through its callback.

use crate::client::{BatchClient, BatchRequest, ClientRegistry, RequestKind};
use crate::codec;
use crate::domain::batch::BatchResult;
use crate::domain::config::VhalConfig;
use crate::domain::error::{VhalError, VhalResult};
use crate::domain::pending::{PendingOwner, PendingRequestPool, PendingStats};
use crate::domain::property_store::PropertyConfigStore;
use crate::domain::validation;
use crate::ports::{ResultSink, VehicleCallback, VehicleHardware};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vhal_types::{
    GetValueRequests, GetValueResult, LargeParcelable, SetValueRequests, SetValueResult,
    VehiclePropConfigs,
};

/// Vehicle HAL service state.
///
/// Must be created inside a tokio runtime: each pending pool gets a timeout
/// sweeper task, aborted when the service is dropped.
pub struct DefaultVehicleHal {
    hardware: Arc<dyn VehicleHardware>,
    configs: PropertyConfigStore,
    threshold: usize,
    get_pool: Arc<PendingRequestPool<GetValueResult>>,
    set_pool: Arc<PendingRequestPool<SetValueResult>>,
    clients: Arc<ClientRegistry>,
    next_client_id: AtomicU64,
    sweepers: Vec<JoinHandle<()>>,
}

impl DefaultVehicleHal {
    /// Service with the default configuration.
    pub fn new(hardware: Arc<dyn VehicleHardware>) -> VhalResult<Self> {
        Self::with_config(hardware, VhalConfig::default())
    }

    /// Create a new service
    pub fn with_config(hardware: Arc<dyn VehicleHardware>, config: VhalConfig) -> VhalResult<Self> {
        config.validate()?;
        let handle = Handle::try_current().map_err(|_| VhalError::NoRuntime)?;

        let configs = PropertyConfigStore::new(hardware.get_all_property_configs());

        let get_pool: Arc<PendingRequestPool<GetValueResult>> = Arc::new(PendingRequestPool::new(
            RequestKind::Get.as_str(),
            config.request_timeout,
        ));
        let set_pool: Arc<PendingRequestPool<SetValueResult>> = Arc::new(PendingRequestPool::new(
            RequestKind::Set.as_str(),
            config.request_timeout,
        ));
        let sweepers = vec![
            get_pool.spawn_sweeper(&handle),
            set_pool.spawn_sweeper(&handle),
        ];

        info!(
            properties = configs.len(),
            timeout_ms = config.request_timeout.as_millis() as u64,
            threshold = config.large_payload_threshold,
            "Vehicle HAL service started"
        );

        Ok(Self {
            hardware,
            configs,
            threshold: config.large_payload_threshold,
            get_pool,
            set_pool,
            clients: Arc::new(ClientRegistry::new()),
            next_client_id: AtomicU64::new(0),
            sweepers,
        })
    }

    /// The full property config catalog.
    pub fn get_all_prop_configs(&self) -> VhalResult<VehiclePropConfigs> {
        Ok(codec::to_large_parcelable(
            self.configs.all().to_vec(),
            self.threshold,
        )?)
    }

    /// Configs for `props`, in the order given. Fails if any is unknown.
    pub fn get_prop_configs(&self, props: &[i32]) -> VhalResult<VehiclePropConfigs> {
        let configs = props
            .iter()
            .map(|&prop| {
                self.configs.get(prop).cloned().ok_or_else(|| {
                    VhalError::InvalidArg(format!("no config for property {prop:#x}"))
                })
            })
            .collect::<VhalResult<Vec<_>>>()?;
        Ok(codec::to_large_parcelable(configs, self.threshold)?)
    }

    /// Read a batch of property values. Results arrive on `callback`.
    pub fn get_values(
        &self,
        callback: &Arc<dyn VehicleCallback>,
        requests: GetValueRequests,
    ) -> VhalResult<()> {
        self.dispatch(callback, requests, &self.get_pool)
    }

    /// Write a batch of property values. Results arrive on `callback`.
    pub fn set_values(
        &self,
        callback: &Arc<dyn VehicleCallback>,
        requests: SetValueRequests,
    ) -> VhalResult<()> {
        self.dispatch(callback, requests, &self.set_pool)
    }

    /// Change the request timeout. Non-positive values are ignored.
    ///
    /// Requests already pending keep their deadline.
    pub fn set_timeout(&self, timeout_nanos: i64) {
        if timeout_nanos <= 0 {
            warn!(timeout_ns = timeout_nanos, "Ignoring non-positive request timeout");
            return;
        }
        let timeout = Duration::from_nanos(timeout_nanos.unsigned_abs());
        self.get_pool.set_timeout(timeout);
        self.set_pool.set_timeout(timeout);
        info!(timeout_ns = timeout_nanos, "Updated request timeout");
    }

    /// Requests of either kind still waiting on hardware.
    pub fn count_pending_requests(&self) -> usize {
        self.get_pool.count_pending_requests() + self.set_pool.count_pending_requests()
    }

    /// Batches not yet answered.
    pub fn count_clients(&self) -> usize {
        self.clients.count()
    }

    pub fn pending_stats(&self, kind: RequestKind) -> PendingStats {
        match kind {
            RequestKind::Get => self.get_pool.stats(),
            RequestKind::Set => self.set_pool.stats(),
        }
    }

    fn dispatch<Q: BatchRequest>(
        &self,
        callback: &Arc<dyn VehicleCallback>,
        batch: LargeParcelable<Q>,
        pool: &Arc<PendingRequestPool<Q::Result>>,
    ) -> VhalResult<()> {
        let requests = codec::from_large_parcelable(batch).map_err(|e| {
            warn!(kind = %Q::KIND, error = %e, "Rejected malformed batch");
            VhalError::from(e)
        })?;

        if let Some(request_id) = validation::find_duplicate(requests.iter().map(Q::request_id)) {
            warn!(kind = %Q::KIND, request_id = request_id, "Rejected batch with duplicate request id");
            return Err(VhalError::InvalidArg(format!(
                "duplicate request id {request_id} in one batch"
            )));
        }

        if let Some((prop, area_id)) = validation::find_duplicate(requests.iter().map(Q::target)) {
            warn!(kind = %Q::KIND, prop = prop, area_id = area_id, "Rejected batch with duplicate target");
            return Err(VhalError::InvalidArg(format!(
                "duplicate request for property {prop:#x} area {area_id:#x} in one batch"
            )));
        }

        if requests.is_empty() {
            debug!(kind = %Q::KIND, "Ignoring empty batch");
            return Ok(());
        }

        let ids: Vec<i64> = requests.iter().map(Q::request_id).collect();
        let mut valid = Vec::with_capacity(requests.len());
        let mut rejected = Vec::new();
        for request in requests {
            match request.validate(&self.configs) {
                Ok(()) => valid.push(request),
                Err(e) => {
                    debug!(
                        kind = %Q::KIND,
                        request_id = request.request_id(),
                        error = %e,
                        "Rejected request"
                    );
                    rejected.push(<Q::Result as BatchResult>::from_status(
                        request.request_id(),
                        e.status(),
                    ));
                }
            }
        }

        let client_id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let client = BatchClient::<Q>::new(
            client_id,
            Arc::clone(callback),
            &ids,
            self.threshold,
            Arc::downgrade(&self.clients),
        );

        // Validation failures are in place before any id can time out.
        let rejected_ids: Vec<i64> = rejected.iter().map(BatchResult::request_id).collect();
        client.record(rejected);

        let owner: Weak<BatchClient<Q>> = Arc::downgrade(&client);
        let owner: Weak<dyn PendingOwner<Q::Result>> = owner;
        pool.add_requests(client_id, owner, &ids)?;
        pool.finish_requests(&rejected_ids);

        self.clients
            .register(client.callback_key(), client_id, client.clone());

        if !valid.is_empty() {
            let valid_ids: Vec<i64> = valid.iter().map(Q::request_id).collect();
            let sink = ResultSink::new(Arc::clone(pool));
            if let Err(status) = Q::submit(self.hardware.as_ref(), sink, valid) {
                error!(
                    kind = %Q::KIND,
                    client_id = client_id,
                    status = %status,
                    "Hardware rejected batch"
                );
                pool.finish_requests(&valid_ids);
                client.abandon();
                return Err(VhalError::Hardware(status));
            }
        }

        debug!(
            kind = %Q::KIND,
            client_id = client_id,
            accepted = ids.len(),
            rejected = rejected_ids.len(),
            "Dispatched batch"
        );
        client.start();
        Ok(())
    }
}

impl Drop for DefaultVehicleHal {
    fn drop(&mut self) {
        for sweeper in &self.sweepers {
            sweeper.abort();
        }

        let pending = self.count_pending_requests();
        if pending > 0 {
            warn!(pending = pending, "Vehicle HAL service dropped with pending requests");
        }
    }
}

#[cfg(test)]
impl DefaultVehicleHal {
    fn pool_sizes(&self) -> (usize, usize) {
        (
            self.get_pool.count_pending_requests(),
            self.set_pool.count_pending_requests(),
        )
    }
}
