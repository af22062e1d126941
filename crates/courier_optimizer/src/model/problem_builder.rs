use std::sync::Arc;

use courier_matrix_providers::travel_matrix_client::TravelMatrixClient;
use fxhash::FxHashMap;
use tracing::{debug, instrument};

use crate::{
    model::{
        callbacks::{ArcDistance, ArcTravelTime, IndexDemands},
        dimension::{DELIVERIES, DISTANCE, Dimension, LOADS, STOPS, TIME, Transit, UNBOUNDED},
        error::BuildError,
        index_manager::IndexManager,
        routing_model::RoutingModel,
    },
    problem::{
        depot::Depot,
        fleet::Fleet,
        order::{Order, OrderIdx, OrderKind, OrderStatus},
        stop_node::StopNode,
        vehicle::VehicleIdx,
    },
    session::session_params::SessionParams,
};

#[derive(Clone, Copy)]
pub enum BuildMode<'a> {
    /// Fresh solve. Vehicles leave their start node at `now`.
    Cold,
    /// Scheduled orders stay on their vehicle and the previous plan seeds the
    /// search. `hints` is indexed by vehicle.
    Reroute { hints: &'a [Vec<OrderIdx>] },
}

pub struct ProblemInput<'a> {
    pub depot: &'a Depot,
    pub orders: &'a [Order],
    pub fleet: &'a Fleet,
    /// Orders the solver may route. Must not contain any vehicle's current stop.
    pub candidates: &'a [OrderIdx],
    pub vehicles: &'a [VehicleIdx],
    /// Minutes since the shift start.
    pub now: i64,
    pub mode: BuildMode<'a>,
}

pub struct ProblemBuilder<'a> {
    params: &'a SessionParams,
    matrix_client: &'a TravelMatrixClient,
}

impl<'a> ProblemBuilder<'a> {
    pub fn new(params: &'a SessionParams, matrix_client: &'a TravelMatrixClient) -> Self {
        ProblemBuilder {
            params,
            matrix_client,
        }
    }

    #[instrument(
        skip_all,
        level = "debug",
        fields(candidates = input.candidates.len(), vehicles = input.vehicles.len())
    )]
    pub fn build(&self, input: &ProblemInput) -> Result<RoutingModel, BuildError> {
        if input.vehicles.is_empty() {
            return Err(BuildError::EmptyProblem("the fleet has no vehicles"));
        }
        if input.candidates.is_empty() {
            return Err(BuildError::EmptyProblem("no orders to route"));
        }

        let (manager, points) = self.build_index_manager(input);
        let matrices = Arc::new(
            self.matrix_client
                .build_matrix(&points, self.params.distance_metric)?,
        );

        let num_indices = manager.num_indices();
        let num_slots = manager.num_vehicles();
        let index_nodes: Arc<[usize]> = (0..num_indices)
            .map(|index| manager.index_to_node(index))
            .collect();
        let index_orders: Vec<Option<&Order>> = (0..num_indices)
            .map(|index| {
                manager
                    .stop_node(index)
                    .order()
                    .map(|order| &input.orders[order])
            })
            .collect();
        let serviced: Arc<[bool]> = index_orders.iter().map(Option::is_some).collect();

        let distance = ArcDistance::new(index_nodes.clone(), matrices.clone());
        let mut model = RoutingModel::new(
            manager,
            Box::new(distance.clone()),
            self.params.search_parameters(),
        );

        let max_distance = self
            .params
            .max_route_distance
            .map(|meters| meters.ceil_i64())
            .unwrap_or(UNBOUNDED);
        model.add_dimension(Dimension::new(
            DISTANCE,
            Transit::Arc(Box::new(distance)),
            0,
            vec![max_distance; num_slots],
            true,
        ));

        let time = self.build_time_dimension(
            input,
            &model,
            &index_orders,
            ArcTravelTime::new(
                index_nodes,
                matrices,
                self.params.travel_times(),
                serviced,
            ),
        );
        let time = model.add_dimension(time);
        model.set_time_dimension(time);

        let capacities: Vec<i64> = input
            .vehicles
            .iter()
            .map(|vehicle| input.fleet.capacities()[vehicle.get()])
            .collect();

        let demands = |signed: fn(&Order) -> i64| -> Vec<i64> {
            index_orders
                .iter()
                .map(|order| order.map_or(0, signed))
                .collect()
        };
        let deliveries = demands(|order| match order.kind() {
            OrderKind::Delivery => -order.volume().demand_units(),
            OrderKind::Pickup => 0,
        });
        let loads = demands(|order| match order.kind() {
            OrderKind::Delivery => -order.volume().demand_units(),
            OrderKind::Pickup => order.volume().demand_units(),
        });

        let deliveries = model.add_dimension(Dimension::new(
            DELIVERIES,
            Transit::Unary(Box::new(IndexDemands::new(deliveries))),
            0,
            capacities.clone(),
            false,
        ));
        let loads = model.add_dimension(Dimension::new(
            LOADS,
            Transit::Unary(Box::new(IndexDemands::new(loads))),
            0,
            capacities,
            false,
        ));
        model.add_start_cumul_equality(deliveries, loads);

        if let Some(limit) = self.params.max_orders_per_vehicle {
            let stops = demands(|_| 1);
            model.add_dimension(Dimension::new(
                STOPS,
                Transit::Unary(Box::new(IndexDemands::new(stops))),
                0,
                vec![limit as i64; num_slots],
                true,
            ));
        }

        for index in model.manager().visitable_indices() {
            if let Some(order) = index_orders[index] {
                model.add_disjunction(index, order.carryforward_penalty());
            }
        }

        if let BuildMode::Reroute { hints } = input.mode {
            self.add_pins_and_hints(&mut model, &index_orders, hints);
        }

        debug!(
            nodes = model.manager().num_nodes(),
            indices = num_indices,
            dimensions = model.dimensions().len(),
            "Built routing model"
        );

        Ok(model)
    }

    fn build_index_manager(&self, input: &ProblemInput) -> (IndexManager, Vec<geo::Point>) {
        let mut nodes = vec![StopNode::Depot];
        let mut order_nodes: FxHashMap<OrderIdx, usize> = FxHashMap::default();

        let mut node_of = |order: OrderIdx, nodes: &mut Vec<StopNode>| -> usize {
            *order_nodes.entry(order).or_insert_with(|| {
                nodes.push(StopNode::Order(order));
                nodes.len() - 1
            })
        };

        for &order in input.candidates {
            node_of(order, &mut nodes);
        }

        let start_nodes: Vec<usize> = input
            .vehicles
            .iter()
            .map(|&vehicle| match input.fleet.vehicle(vehicle).current_node() {
                StopNode::Depot => 0,
                StopNode::Order(order) => node_of(order, &mut nodes),
            })
            .collect();

        let points = nodes
            .iter()
            .map(|node| match node {
                StopNode::Depot => input.depot.location().point(),
                StopNode::Order(order) => input.orders[*order].location().point(),
            })
            .collect();

        (
            IndexManager::new(nodes, &start_nodes, input.vehicles.to_vec()),
            points,
        )
    }

    fn build_time_dimension(
        &self,
        input: &ProblemInput,
        model: &RoutingModel,
        index_orders: &[Option<&Order>],
        travel_time: ArcTravelTime,
    ) -> Dimension {
        let manager = model.manager();
        let horizon = self.params.horizon_minutes();

        let mut time = Dimension::new(
            TIME,
            Transit::Arc(Box::new(travel_time)),
            self.params.max_wait_time.as_mins(),
            vec![horizon; manager.num_vehicles()],
            false,
        );

        for index in manager.visitable_indices() {
            if let Some(window) = index_orders[index].and_then(|order| order.time_window()) {
                let (earliest, latest) = window.minutes_since(self.params.shift_start, horizon);
                time.set_cumul_range(index, earliest, latest);
            }
        }

        for slot in 0..manager.num_vehicles() {
            let latest_start = match input.mode {
                BuildMode::Cold => input.now,
                BuildMode::Reroute { .. } => horizon,
            };
            time.set_cumul_range(manager.start(slot), input.now, latest_start);
        }

        time
    }

    fn add_pins_and_hints(
        &self,
        model: &mut RoutingModel,
        index_orders: &[Option<&Order>],
        hints: &[Vec<OrderIdx>],
    ) {
        let pins: Vec<(usize, usize)> = model
            .manager()
            .visitable_indices()
            .filter_map(|index| {
                let order = index_orders[index]?;
                let OrderStatus::Scheduled(vehicle) = order.status() else {
                    return None;
                };
                model.manager().slot_of(vehicle).map(|slot| (index, slot))
            })
            .collect();

        let warm_start: Vec<(usize, Vec<usize>)> = (0..model.manager().num_vehicles())
            .map(|slot| {
                let manager = model.manager();
                let vehicle = manager.vehicle(slot);
                let indices = hints
                    .get(vehicle.get())
                    .map(|hint| {
                        hint.iter()
                            .filter_map(|order| {
                                let node = manager
                                    .nodes()
                                    .iter()
                                    .position(|node| *node == StopNode::Order(*order))?;
                                manager.node_to_index(node)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                (slot, indices)
            })
            .collect();

        debug!(pins = pins.len(), "Pinned scheduled orders");

        for (index, slot) in pins {
            model.pin(index, slot);
        }
        for (slot, indices) in warm_start {
            model.set_warm_start(slot, indices);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::time_window::TimeWindow,
        test_utils::{create_delivery, create_depot, create_fleet, create_pickup, create_test_params},
    };

    fn orders() -> Vec<Order> {
        vec![
            create_delivery(0.01, 0.0, 3.0),
            create_pickup(0.0, 0.01, 2.0),
            create_delivery(-0.01, 0.0, 1.0),
        ]
    }

    fn all(count: usize) -> Vec<OrderIdx> {
        (0..count).map(OrderIdx::new).collect()
    }

    #[test]
    fn test_empty_fleet() {
        let params = create_test_params();
        let client = TravelMatrixClient::new();
        let orders = orders();
        let fleet = create_fleet(&[]);

        let result = ProblemBuilder::new(&params, &client).build(&ProblemInput {
            depot: &create_depot(),
            orders: &orders,
            fleet: &fleet,
            candidates: &all(3),
            vehicles: &[],
            now: 0,
            mode: BuildMode::Cold,
        });

        assert!(matches!(result, Err(BuildError::EmptyProblem(_))));
    }

    #[test]
    fn test_no_candidates() {
        let params = create_test_params();
        let client = TravelMatrixClient::new();
        let fleet = create_fleet(&[10.0]);

        let result = ProblemBuilder::new(&params, &client).build(&ProblemInput {
            depot: &create_depot(),
            orders: &[],
            fleet: &fleet,
            candidates: &[],
            vehicles: &[VehicleIdx::new(0)],
            now: 0,
            mode: BuildMode::Cold,
        });

        assert!(matches!(result, Err(BuildError::EmptyProblem(_))));
    }

    #[test]
    fn test_cold_model_layout() {
        let mut params = create_test_params();
        params.max_orders_per_vehicle = Some(2);
        let client = TravelMatrixClient::new();
        let mut orders = orders();
        let shift_start = params.shift_start;
        let window = TimeWindow::new(
            Some(shift_start + jiff::SignedDuration::from_mins(30)),
            Some(shift_start + jiff::SignedDuration::from_mins(90)),
        )
        .unwrap();
        let mut builder = crate::problem::order::OrderBuilder::default();
        builder
            .set_location(0.0, -0.01)
            .set_volume(1.0)
            .set_time_window(window);
        orders.push(builder.build().unwrap());

        let fleet = create_fleet(&[10.0, 6.0]);
        let vehicles = [VehicleIdx::new(0), VehicleIdx::new(1)];

        let model = ProblemBuilder::new(&params, &client)
            .build(&ProblemInput {
                depot: &create_depot(),
                orders: &orders,
                fleet: &fleet,
                candidates: &all(4),
                vehicles: &vehicles,
                now: 0,
                mode: BuildMode::Cold,
            })
            .unwrap();

        let manager = model.manager();
        assert_eq!(manager.num_visitable(), 4);
        assert_eq!(manager.num_indices(), 8);
        assert_eq!(model.dimensions().len(), 5);
        assert_eq!(model.start_cumul_equalities(), &[(2, 3)]);
        assert!(!model.has_warm_start());

        for index in manager.visitable_indices() {
            assert_eq!(model.penalty(index), Some(1_000_000));
            assert_eq!(model.pinned_slot(index), None);
        }
        assert_eq!(model.penalty(manager.start(0)), None);

        let deliveries = model.dimension(DELIVERIES).unwrap();
        let loads = model.dimension(LOADS).unwrap();
        assert_eq!(deliveries.transit(0, 1), -3);
        assert_eq!(loads.transit(1, 0), 2);
        assert_eq!(deliveries.transit(1, 0), 0);
        assert_eq!(deliveries.capacity(1), 6);

        let time = model.dimension(TIME).unwrap();
        assert_eq!(time.cumul_range(3), Some((30, 90)));
        assert_eq!(time.cumul_range(manager.start(1)), Some((0, 0)));
        assert_eq!(time.slack_max(), 60);

        let distance = model.dimension(DISTANCE).unwrap();
        assert!(distance.transit(0, manager.end(0)) > 1000);
        assert_eq!(model.arc_cost(manager.start(0), manager.end(0)), 0);
    }

    #[test]
    fn test_reroute_pins_and_hints() {
        let params = create_test_params();
        let client = TravelMatrixClient::new();
        let mut fleet = create_fleet(&[10.0, 10.0]);
        let mut orders = orders();

        orders[0]
            .update_status(OrderStatus::Scheduled(VehicleIdx::new(0)), &mut fleet)
            .unwrap();
        orders[1]
            .update_status(OrderStatus::Scheduled(VehicleIdx::new(1)), &mut fleet)
            .unwrap();
        orders[2]
            .update_status(OrderStatus::Scheduled(VehicleIdx::new(1)), &mut fleet)
            .unwrap();
        // Vehicle 1 is on its way to order 1.
        fleet
            .vehicle_mut(VehicleIdx::new(1))
            .set_current_node(StopNode::Order(OrderIdx::new(1)));

        let hints = vec![vec![OrderIdx::new(0)], vec![OrderIdx::new(2)]];
        let vehicles = [VehicleIdx::new(0), VehicleIdx::new(1)];
        let candidates = [OrderIdx::new(0), OrderIdx::new(2)];

        let model = ProblemBuilder::new(&params, &client)
            .build(&ProblemInput {
                depot: &create_depot(),
                orders: &orders,
                fleet: &fleet,
                candidates: &candidates,
                vehicles: &vehicles,
                now: 15,
                mode: BuildMode::Reroute { hints: &hints },
            })
            .unwrap();

        let manager = model.manager();
        assert_eq!(manager.num_visitable(), 2);
        assert_eq!(
            manager.stop_node(manager.start(1)),
            StopNode::Order(OrderIdx::new(1))
        );
        assert_eq!(model.pinned_slot(0), Some(0));
        assert_eq!(model.pinned_slot(1), Some(1));
        assert_eq!(model.warm_start(0), &[0]);
        assert_eq!(model.warm_start(1), &[1]);

        let time = model.dimension(TIME).unwrap();
        assert_eq!(
            time.cumul_range(manager.start(0)),
            Some((15, params.horizon_minutes()))
        );
    }
}
