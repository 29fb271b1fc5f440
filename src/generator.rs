//! Synthetic device and feedback planning for the test-data endpoints.
//!
//! Everything here is pure: given an RNG and a validated [`SamplingConfig`],
//! the planners produce in-memory rows for the repositories to persist.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::models::FeedbackType;
use crate::sampler::{FeedbackTypeSampler, SamplingConfig};

/// Placeholder locations assigned to synthetic devices.
pub const TEST_LOCATIONS: [&str; 8] = [
    "Main office",
    "Meeting room A - 1st floor",
    "Reception - Main entrance",
    "Cafeteria - 2nd floor",
    "Training room - 3rd floor",
    "Open space - East wing",
    "Laboratory - Basement",
    "Terrace - Rooftop",
];

/// How a batch total maps onto devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountPolicy {
    /// Every device receives exactly this many records.
    PerDevice(u32),
    /// A single global total spread over all devices, either round-robin
    /// (record i goes to device i % deviceCount) or uniformly at random.
    GlobalTotal { total: u32, distribute_evenly: bool },
}

/// Synthetic device awaiting insertion.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedDevice {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub location: String,
}

/// Synthetic feedback awaiting insertion. `device_index` refers into the
/// device slice the batch was planned against.
#[derive(Debug, Clone)]
pub struct PlannedFeedback {
    pub id: Uuid,
    pub device_index: usize,
    pub feedback_type: FeedbackType,
    pub session_id: String,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
}

/// Plan `count` synthetic devices: zero-padded names, `TEST-XXXXXX` codes,
/// random placeholder locations.
pub fn plan_devices<R: Rng>(rng: &mut R, count: u32) -> Vec<PlannedDevice> {
    (1..=count)
        .map(|i| PlannedDevice {
            id: Uuid::new_v4(),
            name: format!("Device Test {i:02}"),
            code: format!("TEST-{}", random_code(rng, 6)),
            location: TEST_LOCATIONS[rng.gen_range(0..TEST_LOCATIONS.len())].to_string(),
        })
        .collect()
}

/// Plan a feedback batch. Device assignment follows the count policy; type
/// assignment is one independent sampler draw per record; timestamps are
/// uniform over the trailing `days_range` days.
pub fn plan_feedback_batch<R: Rng, S: Rng>(
    rng: &mut R,
    sampler: &mut FeedbackTypeSampler<'_, S>,
    device_count: usize,
    policy: CountPolicy,
    days_range: u32,
) -> Vec<PlannedFeedback> {
    if device_count == 0 {
        return Vec::new();
    }

    let mut batch = Vec::new();

    match policy {
        CountPolicy::PerDevice(per_device) => {
            for device_index in 0..device_count {
                for _ in 0..per_device {
                    batch.push(plan_one(rng, sampler, device_index, days_range));
                }
            }
        }
        CountPolicy::GlobalTotal {
            total,
            distribute_evenly,
        } => {
            for i in 0..total as usize {
                let device_index = if distribute_evenly {
                    i % device_count
                } else {
                    rng.gen_range(0..device_count)
                };
                batch.push(plan_one(rng, sampler, device_index, days_range));
            }
        }
    }

    batch
}

fn plan_one<R: Rng, S: Rng>(
    rng: &mut R,
    sampler: &mut FeedbackTypeSampler<'_, S>,
    device_index: usize,
    days_range: u32,
) -> PlannedFeedback {
    PlannedFeedback {
        id: Uuid::new_v4(),
        device_index,
        feedback_type: sampler.next_type(),
        session_id: random_session_id(rng),
        ip_address: random_ip(rng),
        created_at: random_timestamp(rng, days_range),
    }
}

/// `sess_` followed by 20 alphanumerics.
pub fn random_session_id<R: Rng>(rng: &mut R) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect();
    format!("sess_{suffix}")
}

/// Plausible IPv4 with every octet in [1, 254].
pub fn random_ip<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.gen_range(1..=254),
        rng.gen_range(1..=254),
        rng.gen_range(1..=254),
        rng.gen_range(1..=254)
    )
}

/// Uniformly random instant within the trailing `days_range` days.
pub fn random_timestamp<R: Rng>(rng: &mut R, days_range: u32) -> DateTime<Utc> {
    let window_secs = i64::from(days_range) * 86_400;
    Utc::now() - Duration::seconds(rng.gen_range(0..=window_secs))
}

fn random_code<R: Rng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plan(
        seed: u64,
        device_count: usize,
        policy: CountPolicy,
        config: &SamplingConfig,
    ) -> Vec<PlannedFeedback> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sampler = FeedbackTypeSampler::new(config, StdRng::seed_from_u64(seed ^ 0xff));
        plan_feedback_batch(&mut rng, &mut sampler, device_count, policy, 30)
    }

    #[test]
    fn test_plan_devices_names_codes_locations() {
        let mut rng = StdRng::seed_from_u64(1);
        let devices = plan_devices(&mut rng, 12);

        assert_eq!(devices.len(), 12);
        assert_eq!(devices[0].name, "Device Test 01");
        assert_eq!(devices[11].name, "Device Test 12");
        for device in &devices {
            assert!(device.code.starts_with("TEST-"));
            assert_eq!(device.code.len(), 11);
            assert_eq!(device.code, device.code.to_uppercase());
            assert!(TEST_LOCATIONS.contains(&device.location.as_str()));
        }
    }

    #[test]
    fn test_per_device_policy_gives_every_device_its_count() {
        let config = SamplingConfig::default();
        let batch = plan(2, 4, CountPolicy::PerDevice(25), &config);

        assert_eq!(batch.len(), 100);
        for device_index in 0..4 {
            let count = batch.iter().filter(|f| f.device_index == device_index).count();
            assert_eq!(count, 25);
        }
    }

    #[test]
    fn test_even_distribution_is_round_robin() {
        let config = SamplingConfig::default();
        let policy = CountPolicy::GlobalTotal {
            total: 10,
            distribute_evenly: true,
        };
        let batch = plan(3, 3, policy, &config);

        assert_eq!(batch.len(), 10);
        for (i, feedback) in batch.iter().enumerate() {
            assert_eq!(feedback.device_index, i % 3);
        }
    }

    #[test]
    fn test_random_distribution_targets_valid_devices() {
        let config = SamplingConfig::default();
        let policy = CountPolicy::GlobalTotal {
            total: 500,
            distribute_evenly: false,
        };
        let batch = plan(4, 5, policy, &config);

        assert_eq!(batch.len(), 500);
        assert!(batch.iter().all(|f| f.device_index < 5));
        // With 500 draws over 5 devices, every device should be hit.
        for device_index in 0..5 {
            assert!(batch.iter().any(|f| f.device_index == device_index));
        }
    }

    #[test]
    fn test_batch_respects_sampling_config() {
        let config = SamplingConfig::specific_types(vec![FeedbackType::Satisfied]).unwrap();
        let batch = plan(9, 2, CountPolicy::PerDevice(50), &config);

        assert_eq!(batch.len(), 100);
        assert!(batch.iter().all(|f| f.feedback_type == FeedbackType::Satisfied));
    }

    #[test]
    fn test_zero_devices_yield_empty_batch() {
        let config = SamplingConfig::default();
        let policy = CountPolicy::GlobalTotal {
            total: 10,
            distribute_evenly: true,
        };
        let batch = plan(5, 0, policy, &config);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_session_id_shape() {
        let mut rng = StdRng::seed_from_u64(6);
        let session_id = random_session_id(&mut rng);

        assert!(session_id.starts_with("sess_"));
        assert_eq!(session_id.len(), 25);
        assert!(session_id[5..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_ip_octets_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let ip = random_ip(&mut rng);
            let octets: Vec<u32> = ip.split('.').map(|o| o.parse().unwrap()).collect();
            assert_eq!(octets.len(), 4);
            assert!(octets.iter().all(|&o| (1..=254).contains(&o)));
        }
    }

    #[test]
    fn test_random_timestamp_stays_inside_window() {
        let mut rng = StdRng::seed_from_u64(8);
        let days_range = 30;
        let floor = Utc::now() - Duration::days(i64::from(days_range)) - Duration::minutes(1);
        for _ in 0..100 {
            let ts = random_timestamp(&mut rng, days_range);
            assert!(ts <= Utc::now());
            assert!(ts >= floor);
        }
    }
}
