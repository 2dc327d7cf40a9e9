//! Shared fixtures for the dispatcher integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use vhal_dispatch::codec;
use vhal_dispatch::{
    init_tracing, DefaultVehicleHal, ResultSink, TracingConfig, VehicleCallback, VehicleHardware,
};
use vhal_types::{
    area_window, GetValueRequest, GetValueRequests, GetValueResult, GetValueResults,
    LargeParcelable, PropertyValue, RawPropValues, SetValueRequest, SetValueRequests,
    SetValueResult, SetValueResults, StatusCode, VehicleAreaConfig, VehiclePropConfig,
};

pub const INVALID_PROP_ID: i32 = 0;
// VehiclePropertyGroup:SYSTEM, VehicleArea:WINDOW, VehiclePropertyType:INT32
pub const INT32_WINDOW_PROP: i32 = 10001 + 0x1000_0000 + 0x0300_0000 + 0x0040_0000;

pub const THRESHOLD: usize = 4096;

/// 0.1s
pub const TIMEOUT_NANOS: i64 = 100_000_000;

// VehiclePropertyGroup:SYSTEM, VehicleArea:GLOBAL, VehiclePropertyType:INT32_VEC
pub fn test_int32_vec_prop(i: usize) -> i32 {
    i as i32 + 0x1000_0000 + 0x0100_0000 + 0x0041_0000
}

pub const GET_VALUES: &str = "getValues";
pub const SET_VALUES: &str = "setValues";

#[derive(Default)]
struct HardwareState {
    configs: Vec<VehiclePropConfig>,
    get_responses: VecDeque<Vec<GetValueResult>>,
    set_responses: VecDeque<Vec<SetValueResult>>,
    get_requests: VecDeque<Vec<GetValueRequest>>,
    set_requests: VecDeque<Vec<SetValueRequest>>,
    statuses: HashMap<&'static str, StatusCode>,
    sleep_time: Duration,
}

/// Hardware answering from queued responses, optionally after a delay.
#[derive(Default)]
pub struct MockVehicleHardware {
    state: Mutex<HardwareState>,
}

impl MockVehicleHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_property_configs(&self, configs: Vec<VehiclePropConfig>) {
        self.state.lock().configs = configs;
    }

    pub fn add_get_value_responses(&self, responses: Vec<GetValueResult>) {
        self.state.lock().get_responses.push_back(responses);
    }

    pub fn add_set_value_responses(&self, responses: Vec<SetValueResult>) {
        self.state.lock().set_responses.push_back(responses);
    }

    pub fn next_get_value_requests(&self) -> Option<Vec<GetValueRequest>> {
        self.state.lock().get_requests.pop_front()
    }

    pub fn next_set_value_requests(&self) -> Option<Vec<SetValueRequest>> {
        self.state.lock().set_requests.pop_front()
    }

    /// Make `method` fail the whole batch with `status`.
    pub fn set_status(&self, method: &'static str, status: StatusCode) {
        self.state.lock().statuses.insert(method, status);
    }

    pub fn set_sleep_time(&self, nanos: i64) {
        self.state.lock().sleep_time = Duration::from_nanos(nanos as u64);
    }
}

fn respond<R: vhal_dispatch::domain::BatchResult>(
    sink: ResultSink<R>,
    responses: Option<Vec<R>>,
    delay: Duration,
) {
    let Some(responses) = responses else {
        return;
    };
    if delay.is_zero() {
        sink.deliver(responses);
        return;
    }
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        sink.deliver(responses);
    });
}

impl VehicleHardware for MockVehicleHardware {
    fn get_all_property_configs(&self) -> Vec<VehiclePropConfig> {
        self.state.lock().configs.clone()
    }

    fn get_values(
        &self,
        sink: ResultSink<GetValueResult>,
        requests: Vec<GetValueRequest>,
    ) -> Result<(), StatusCode> {
        let (responses, delay) = {
            let mut state = self.state.lock();
            if let Some(&status) = state.statuses.get(GET_VALUES) {
                return Err(status);
            }
            state.get_requests.push_back(requests);
            (state.get_responses.pop_front(), state.sleep_time)
        };
        respond(sink, responses, delay);
        Ok(())
    }

    fn set_values(
        &self,
        sink: ResultSink<SetValueResult>,
        requests: Vec<SetValueRequest>,
    ) -> Result<(), StatusCode> {
        let (responses, delay) = {
            let mut state = self.state.lock();
            if let Some(&status) = state.statuses.get(SET_VALUES) {
                return Err(status);
            }
            state.set_requests.push_back(requests);
            (state.set_responses.pop_front(), state.sleep_time)
        };
        respond(sink, responses, delay);
        Ok(())
    }
}

/// Callback queueing every batch it receives.
#[derive(Default)]
pub struct MockVehicleCallback {
    get_results: Mutex<VecDeque<GetValueResults>>,
    set_results: Mutex<VecDeque<SetValueResults>>,
}

impl MockVehicleCallback {
    pub fn next_get_value_results(&self) -> Option<GetValueResults> {
        self.get_results.lock().pop_front()
    }

    pub fn next_set_value_results(&self) -> Option<SetValueResults> {
        self.set_results.lock().pop_front()
    }
}

impl VehicleCallback for MockVehicleCallback {
    fn on_get_values(&self, results: GetValueResults) {
        self.get_results.lock().push_back(results);
    }

    fn on_set_values(&self, results: SetValueResults) {
        self.set_results.lock().push_back(results);
    }
}

/// 10000 global INT32_VEC properties with range 0-100, plus one window
/// property that only allows ROW_1_LEFT.
pub fn test_configs() -> Vec<VehiclePropConfig> {
    let mut configs: Vec<VehiclePropConfig> = (0..10000)
        .map(|i| {
            VehiclePropConfig::new(test_int32_vec_prop(i))
                .with_area(VehicleAreaConfig::new(0).with_int32_range(0, 100))
        })
        .collect();
    configs.push(
        VehiclePropConfig::new(INT32_WINDOW_PROP).with_area(
            VehicleAreaConfig::new(area_window::ROW_1_LEFT).with_int32_range(0, 100),
        ),
    );
    configs
}

pub struct Fixture {
    pub vhal: DefaultVehicleHal,
    pub hardware: Arc<MockVehicleHardware>,
    pub callback: Arc<MockVehicleCallback>,
    pub callback_client: Arc<dyn VehicleCallback>,
}

impl Fixture {
    /// Must run inside a tokio runtime.
    pub fn new() -> Self {
        init_tracing(&TracingConfig::for_tests());

        let hardware = Arc::new(MockVehicleHardware::new());
        hardware.set_property_configs(test_configs());
        let vhal = DefaultVehicleHal::new(hardware.clone()).expect("create service");
        let callback = Arc::new(MockVehicleCallback::default());
        let callback_client: Arc<dyn VehicleCallback> = callback.clone();

        Self {
            vhal,
            hardware,
            callback,
            callback_client,
        }
    }

    pub fn assert_no_pending(&self) {
        assert_eq!(
            self.vhal.count_pending_requests(),
            0,
            "must have no pending requests when test finishes"
        );
    }
}

pub struct GetValuesCase {
    pub requests: GetValueRequests,
    pub expected_results: Vec<GetValueResult>,
    pub expected_hardware_requests: Vec<GetValueRequest>,
}

pub fn get_values_test_cases(size: usize) -> GetValuesCase {
    let mut expected_results = Vec::with_capacity(size);
    let mut expected_hardware_requests = Vec::with_capacity(size);
    for i in 0..size {
        let request_id = i as i64;
        let prop = test_int32_vec_prop(i);
        expected_hardware_requests.push(GetValueRequest {
            request_id,
            prop: PropertyValue::new(prop, 0),
        });
        expected_results.push(GetValueResult::ok(
            request_id,
            PropertyValue::new(prop, 0).with_value(RawPropValues::int32s([1, 2, 3, 4])),
        ));
    }

    let requests = codec::to_large_parcelable(expected_hardware_requests.clone(), THRESHOLD)
        .expect("encode get requests");
    GetValuesCase {
        requests,
        expected_results,
        expected_hardware_requests,
    }
}

pub struct SetValuesCase {
    pub requests: SetValueRequests,
    pub expected_results: Vec<SetValueResult>,
    pub expected_hardware_requests: Vec<SetValueRequest>,
}

pub fn set_values_test_cases(size: usize) -> SetValuesCase {
    let mut expected_results = Vec::with_capacity(size);
    let mut expected_hardware_requests = Vec::with_capacity(size);
    for i in 0..size {
        let request_id = i as i64;
        expected_hardware_requests.push(SetValueRequest {
            request_id,
            value: PropertyValue::new(test_int32_vec_prop(i), 0)
                .with_value(RawPropValues::int32s([1, 2, 3, 4])),
        });
        expected_results.push(SetValueResult::new(request_id, StatusCode::Ok));
    }

    let requests = codec::to_large_parcelable(expected_hardware_requests.clone(), THRESHOLD)
        .expect("encode set requests");
    SetValuesCase {
        requests,
        expected_results,
        expected_hardware_requests,
    }
}

pub fn try_again_get(results: &[GetValueResult]) -> Vec<GetValueResult> {
    results
        .iter()
        .map(|r| GetValueResult::error(r.request_id, StatusCode::TryAgain))
        .collect()
}

pub fn try_again_set(results: &[SetValueResult]) -> Vec<SetValueResult> {
    results
        .iter()
        .map(|r| SetValueResult::new(r.request_id, StatusCode::TryAgain))
        .collect()
}

/// Inline batch of `payloads`.
pub fn inline<T>(payloads: Vec<T>) -> LargeParcelable<T> {
    LargeParcelable::inline(payloads)
}
