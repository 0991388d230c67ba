use crate::allocation::{
    CapacityPolicy, LotteryEngine, OrderClaimEngine, OrderIntake, OrderRoundBinder, RateLimiter,
    RoundScheduler, SignupAllocator,
};
use crate::clients::{InventoryClient, OrderClient, RoundClient, UserClient};
use crate::clock::{Clock, LotteryDraw, SystemClock};
use crate::collaborators::{CapabilityCheck, InventoryReservations};
use crate::config::AllocatorConfig;
use crate::lifecycle::maintenance::{MaintenanceSweep, SweepReport};
use crate::notification::{LoggingSink, NotificationQueue, NotificationSink, NotificationWorker};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// The runtime orchestrator for the outreach allocation core.
///
/// `OutreachSystem` is responsible for:
/// - **Lifecycle Management**: starting and stopping the actors, the notification worker and
///   the maintenance sweep
/// - **Dependency Wiring**: the Order actor gets the inventory as its reservation service,
///   the services get the clients they coordinate
///
/// # Example
///
/// ```ignore
/// let system = OutreachSystem::new();
///
/// let signup = system.signups.signup_for_round(round_id, user_id, None).await?;
/// let winners = system.lottery.run_lottery_for_round(round_id).await?;
///
/// system.shutdown().await?;
/// ```
pub struct OutreachSystem {
    pub users: UserClient,
    pub inventory: InventoryClient,
    pub rounds: RoundClient,
    pub orders: OrderClient,

    pub signups: SignupAllocator,
    pub lottery: LotteryEngine,
    pub capacity: CapacityPolicy,
    pub binder: OrderRoundBinder,
    pub claims: OrderClaimEngine,
    pub rate_limiter: RateLimiter,
    pub intake: OrderIntake,
    pub scheduler: RoundScheduler,

    maintenance: MaintenanceSweep,
    shutdown_tx: watch::Sender<bool>,
    sweep_handle: tokio::task::JoinHandle<()>,
    /// Task handles for the actors and the notification worker
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for OutreachSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl OutreachSystem {
    /// Default config, wall clock, notifications to the log.
    pub fn new() -> Self {
        Self::start(
            AllocatorConfig::default(),
            Arc::new(SystemClock),
            Arc::new(LoggingSink),
        )
    }

    /// Spawns every task and wires the services together.
    pub fn start(
        config: AllocatorConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let mailbox = config.actors.mailbox_capacity;

        // 1. Create actors (no dependencies yet)
        let (user_actor, users) = crate::user_actor::new(mailbox);
        let (inventory_actor, inventory) = crate::inventory_actor::new(mailbox);
        let (round_actor, rounds) = crate::round_actor::new(mailbox);
        let (order_actor, orders) = crate::order_actor::new(mailbox);

        // 2. Start actors with injected context
        let reservations: Arc<dyn InventoryReservations> = Arc::new(inventory.clone());
        let mut handles = vec![
            tokio::spawn(user_actor.run(())),
            tokio::spawn(inventory_actor.run(())),
            tokio::spawn(round_actor.run(())),
            tokio::spawn(order_actor.run(reservations)),
        ];

        let (notifications, receiver) =
            NotificationQueue::channel(config.notifications.queue_capacity);
        handles.push(tokio::spawn(
            NotificationWorker::new(receiver, users.clone(), sink).run(),
        ));

        // 3. Services
        let capabilities: Arc<dyn CapabilityCheck> = Arc::new(users.clone());
        let draw = Arc::new(match config.signup.lottery_seed {
            Some(seed) => LotteryDraw::seeded(seed, config.signup.lottery_number_max),
            None => LotteryDraw::from_entropy(config.signup.lottery_number_max),
        });

        let binder = OrderRoundBinder::new(rounds.clone(), orders.clone(), clock.clone());
        let lottery = LotteryEngine::new(rounds.clone(), notifications.clone(), clock.clone());
        let capacity = CapacityPolicy::new(
            rounds.clone(),
            orders.clone(),
            capabilities.clone(),
            config.capacity.clone(),
            clock.clone(),
        );
        let signups = SignupAllocator::new(
            rounds.clone(),
            users.clone(),
            capabilities.clone(),
            lottery.clone(),
            binder.clone(),
            draw,
            notifications.clone(),
            clock.clone(),
        );
        let claims = OrderClaimEngine::new(orders.clone(), capacity.clone(), clock.clone());
        let rate_limiter =
            RateLimiter::new(orders.clone(), config.rate_limit.clone(), clock.clone());
        let intake = OrderIntake::new(
            rate_limiter.clone(),
            orders.clone(),
            binder.clone(),
            clock.clone(),
        );
        let scheduler = RoundScheduler::new(
            rounds.clone(),
            binder.clone(),
            capabilities,
            notifications,
            config.capacity.clone(),
            clock,
        );

        // 4. Maintenance
        let maintenance = MaintenanceSweep::new(rate_limiter.clone(), binder.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweep_handle = tokio::spawn(
            maintenance
                .clone()
                .run(config.maintenance.sweep_interval(), shutdown_rx),
        );

        info!(mailbox, "Outreach system started");
        Self {
            users,
            inventory,
            rounds,
            orders,
            signups,
            lottery,
            capacity,
            binder,
            claims,
            rate_limiter,
            intake,
            scheduler,
            maintenance,
            shutdown_tx,
            sweep_handle,
            handles,
        }
    }

    /// Runs one maintenance pass now instead of waiting for the interval.
    pub async fn run_maintenance_once(&self) -> SweepReport {
        self.maintenance.run_once().await
    }

    /// Gracefully shuts down the entire system.
    ///
    /// 1. Stops the maintenance sweep and waits for it
    /// 2. Drops every client and service, which closes the actor channels and the
    ///    notification queue
    /// 3. Waits for the worker and every actor task to finish
    ///
    /// The notification worker holds a `UserClient`, and the Order actor holds the inventory
    /// client, so those actors stop only after their dependents have.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.sweep_handle.await {
            error!("Maintenance task failed: {:?}", e);
            return Err(format!("Maintenance task failed: {:?}", e));
        }

        drop(self.maintenance);
        drop(self.scheduler);
        drop(self.intake);
        drop(self.rate_limiter);
        drop(self.claims);
        drop(self.signups);
        drop(self.capacity);
        drop(self.lottery);
        drop(self.binder);
        drop(self.orders);
        drop(self.rounds);
        drop(self.inventory);
        drop(self.users);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Task failed: {:?}", e);
                return Err(format!("Task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
