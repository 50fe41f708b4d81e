use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::redis::RedisClient;
use adapter::repository::event::EventRepositoryImpl;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::registration::RegistrationRepositoryImpl;
use adapter::repository::session::SessionRepositoryImpl;
use adapter::repository::user::UserRepositoryImpl;
use adapter::scheduler::ReminderScheduler;
use adapter::telegram::TelegramNotifier;
use kernel::flow::RegistrationFlow;
use kernel::notifier::Notifier;
use kernel::repository::event::EventRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::registration::RegistrationRepository;
use kernel::repository::user::UserRepository;
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    app_config: Arc<AppConfig>,
    health_check_repository: Arc<dyn HealthCheckRepository>,
    user_repository: Arc<dyn UserRepository>,
    event_repository: Arc<dyn EventRepository>,
    registration_repository: Arc<dyn RegistrationRepository>,
    registration_flow: Arc<RegistrationFlow>,
    notifier: Arc<dyn Notifier>,
    reminder_scheduler: Arc<ReminderScheduler>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, redis_client: Arc<RedisClient>, app_config: AppConfig) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let event_repository = Arc::new(EventRepositoryImpl::new(pool.clone()));
        let registration_repository = Arc::new(RegistrationRepositoryImpl::new(pool.clone()));
        let session_repository = Arc::new(SessionRepositoryImpl::new(
            redis_client.clone(),
            app_config.session.ttl,
        ));
        let registration_flow = Arc::new(RegistrationFlow::new(session_repository));
        let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(&app_config.bot));
        let reminder_scheduler = Arc::new(ReminderScheduler::new(notifier.clone()));
        Self {
            app_config: Arc::new(app_config),
            health_check_repository,
            user_repository,
            event_repository,
            registration_repository,
            registration_flow,
            notifier,
            reminder_scheduler,
        }
    }

    pub fn app_config(&self) -> Arc<AppConfig> {
        self.app_config.clone()
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn event_repository(&self) -> Arc<dyn EventRepository> {
        self.event_repository.clone()
    }

    pub fn registration_repository(&self) -> Arc<dyn RegistrationRepository> {
        self.registration_repository.clone()
    }

    pub fn registration_flow(&self) -> Arc<RegistrationFlow> {
        self.registration_flow.clone()
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    pub fn reminder_scheduler(&self) -> Arc<ReminderScheduler> {
        self.reminder_scheduler.clone()
    }
}
