use burn::tensor::{backend::Backend, Tensor, TensorData};

use crate::game::{GameState, LANE_COUNT};

/// Length of the observation vector: player lane plus one distance per lane
pub const OBSERVATION_SIZE: usize = 1 + LANE_COUNT;

/// Create the observation vector from game state.
///
/// Layout:
/// - 0: player lane index
/// - 1..=3: distance from the car to the nearest visible obstacle in lanes
///   0, 1, 2; `corridor_height` (500 by default) when the lane is empty
///
/// Obstacles still above the corridor top are excluded from the per-lane
/// minima. This vector is the entire contract between the engine and an
/// agent: no raw obstacle positions or identities are exposed.
///
/// Returns: Tensor<B, 1> with shape [4]
pub fn create_observation<B: Backend>(state: &GameState, device: &B::Device) -> Tensor<B, 1> {
    let mut data = Vec::with_capacity(OBSERVATION_SIZE);
    data.push(state.player_lane as f32);

    for lane in 0..LANE_COUNT {
        data.push(
            state
                .nearest_lane_distance(lane)
                .unwrap_or(state.corridor_height),
        );
    }

    let tensor_data = TensorData::new(data, [OBSERVATION_SIZE]);

    Tensor::<B, 1>::from_data(tensor_data, device)
}
