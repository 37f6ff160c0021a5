//! Appointment lifecycle manager.
//!
//! Sole authority for state-changing appointment operations. Every write runs
//! inside `EntityStore::atomically`, re-reads the free slots at commit time
//! and relies on the store's uniqueness index as a last line of defence, so a
//! stale availability list on the caller side can never double-book a slot.
//!
//! ```text
//!            create
//!              │
//!              ▼
//!         ┌─────────┐  cancel   ┌───────────┐
//!         │scheduled│──────────►│ cancelled │
//!         └─────────┘           └───────────┘
//!              │ complete
//!              ▼
//!         ┌─────────┐
//!         │completed│      delete: any state, removes the record
//!         └─────────┘
//! ```

use chrono::{Local, NaiveDate, SubsecRound};

use super::error::SchedulingError;
use super::hours::HoursPolicy;
use super::notify::{AppointmentEvent, EventKind, Notifier};
use super::slots::SlotCalculator;
use super::summary::{filter_appointments, validate_filter};
use super::validation::{
    validate_appointment, AppointmentSubmission, ValidatedAppointment, ValidationErrors,
};
use crate::db::{DatabaseError, EntityStore};
use crate::models::{
    Appointment, AppointmentFilter, AppointmentStatus, Client, Professional, Service,
};

const APPOINTMENT: &str = "Appointment";

/// Referenced records, loaded and checked within the write transaction.
struct References {
    client: Client,
    professional: Professional,
    service: Service,
}

pub struct AppointmentLifecycle<'a, S, P> {
    store: &'a S,
    calculator: SlotCalculator<P>,
    notifier: &'a dyn Notifier,
    notes_max_chars: usize,
}

impl<'a, S: EntityStore, P: HoursPolicy> AppointmentLifecycle<'a, S, P> {
    pub fn new(
        store: &'a S,
        policy: P,
        notifier: &'a dyn Notifier,
        notes_max_chars: usize,
    ) -> Self {
        Self {
            store,
            calculator: SlotCalculator::new(policy),
            notifier,
            notes_max_chars,
        }
    }

    pub fn calculator(&self) -> &SlotCalculator<P> {
        &self.calculator
    }

    /// Run the validator against this manager's hours and notes limit.
    pub fn validate(
        &self,
        submission: &AppointmentSubmission,
        today: NaiveDate,
    ) -> Result<ValidatedAppointment, SchedulingError> {
        let validated = validate_appointment(
            submission,
            self.calculator.policy(),
            today,
            self.notes_max_chars,
        )?;
        Ok(validated)
    }

    pub fn create(&self, input: &ValidatedAppointment) -> Result<Appointment, SchedulingError> {
        let created = self.store.atomically(|store| {
            let refs = self.resolve_references(store, input)?;
            self.ensure_slot_free(store, input, None)?;

            let record = Appointment {
                id: 0,
                client_id: refs.client.id,
                client_name: refs.client.name,
                professional_id: refs.professional.id,
                professional_name: refs.professional.name,
                service_id: refs.service.id,
                service_name: refs.service.name,
                date: input.date(),
                time: input.time(),
                status: AppointmentStatus::Scheduled,
                notes: input.notes().map(str::to_string),
                // Stored at whole-second precision
                created_at: Local::now().naive_local().trunc_subsecs(0),
            };
            self.persist(store, &record)
        })?;

        tracing::info!(
            appointment_id = created.id,
            professional_id = created.professional_id,
            date = %created.date,
            time = %created.time,
            "Appointment created"
        );
        self.notifier
            .notify(AppointmentEvent::new(EventKind::Created, created.id));
        Ok(created)
    }

    /// Replace the editable fields of a scheduled appointment.
    ///
    /// Status and creation timestamp are kept. The appointment's own current
    /// slot does not count as taken.
    pub fn update(
        &self,
        id: i64,
        input: &ValidatedAppointment,
    ) -> Result<Appointment, SchedulingError> {
        let updated = self.store.atomically(|store| {
            let existing = Self::load(store, id)?;
            Self::ensure_not_terminal(&existing, "update")?;

            let refs = self.resolve_references(store, input)?;
            self.ensure_slot_free(store, input, Some(id))?;

            let record = Appointment {
                id,
                client_id: refs.client.id,
                client_name: refs.client.name,
                professional_id: refs.professional.id,
                professional_name: refs.professional.name,
                service_id: refs.service.id,
                service_name: refs.service.name,
                date: input.date(),
                time: input.time(),
                status: existing.status,
                notes: input.notes().map(str::to_string),
                created_at: existing.created_at,
            };
            self.persist(store, &record)
        })?;

        tracing::info!(
            appointment_id = id,
            professional_id = updated.professional_id,
            date = %updated.date,
            time = %updated.time,
            "Appointment updated"
        );
        Ok(updated)
    }

    /// `scheduled -> cancelled`. The slot becomes bookable again.
    pub fn cancel(&self, id: i64) -> Result<Appointment, SchedulingError> {
        let cancelled = self.transition(id, AppointmentStatus::Cancelled, "cancel")?;
        self.notifier
            .notify(AppointmentEvent::new(EventKind::Cancelled, id));
        Ok(cancelled)
    }

    /// `scheduled -> completed`.
    pub fn complete(&self, id: i64) -> Result<Appointment, SchedulingError> {
        self.transition(id, AppointmentStatus::Completed, "complete")
    }

    /// Hard delete from any state. No notification.
    pub fn delete(&self, id: i64) -> Result<(), SchedulingError> {
        self.store.atomically(|store| {
            let existing = Self::load(store, id)?;
            store.remove_where::<Appointment, _>(|a| a.id == id)?;
            tracing::info!(
                appointment_id = id,
                status = %existing.status,
                "Appointment deleted"
            );
            Ok(())
        })
    }

    pub fn get(&self, id: i64) -> Result<Appointment, SchedulingError> {
        Self::load(self.store, id)
    }

    /// Load an appointment that may still be edited.
    ///
    /// Terminal appointments fail with `InvalidTransition` before any field
    /// validation runs, so an old completed booking is not reported as a
    /// past date.
    pub fn get_editable(&self, id: i64) -> Result<Appointment, SchedulingError> {
        let appointment = Self::load(self.store, id)?;
        Self::ensure_not_terminal(&appointment, "update")?;
        Ok(appointment)
    }

    /// Appointments matching `filter`, ordered by date, then time.
    pub fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, SchedulingError> {
        validate_filter(filter)?;
        Ok(filter_appointments(self.store, filter)?)
    }

    fn transition(
        &self,
        id: i64,
        to: AppointmentStatus,
        action: &'static str,
    ) -> Result<Appointment, SchedulingError> {
        let updated = self.store.atomically(|store| {
            let mut appointment = Self::load(store, id)?;
            Self::ensure_not_terminal(&appointment, action)?;
            appointment.status = to;
            Ok::<_, SchedulingError>(store.put(&appointment)?)
        })?;

        tracing::info!(appointment_id = id, status = %to, "Appointment status changed");
        Ok(updated)
    }

    fn ensure_not_terminal(
        appointment: &Appointment,
        action: &'static str,
    ) -> Result<(), SchedulingError> {
        if appointment.status.is_terminal() {
            return Err(SchedulingError::InvalidTransition {
                id: appointment.id,
                from: appointment.status,
                action,
            });
        }
        Ok(())
    }

    fn load(store: &S, id: i64) -> Result<Appointment, SchedulingError> {
        store
            .get::<Appointment>(id)?
            .ok_or(SchedulingError::NotFound {
                entity: APPOINTMENT,
                id,
            })
    }

    fn resolve_references(
        &self,
        store: &S,
        input: &ValidatedAppointment,
    ) -> Result<References, SchedulingError> {
        let client: Client = store
            .get(input.client_id())?
            .ok_or(SchedulingError::NotFound {
                entity: "Client",
                id: input.client_id(),
            })?;
        let professional: Professional = store
            .get(input.professional_id())?
            .ok_or(SchedulingError::NotFound {
                entity: "Professional",
                id: input.professional_id(),
            })?;
        let service: Service = store
            .get(input.service_id())?
            .ok_or(SchedulingError::NotFound {
                entity: "Service",
                id: input.service_id(),
            })?;

        let mut errors = ValidationErrors::new();
        if !client.active {
            errors.add("client_id", "Client is inactive");
        }
        if !professional.active {
            errors.add("professional_id", "Professional is inactive");
        }
        if !service.active {
            errors.add("service_id", "Service is inactive");
        }

        Ok(errors.into_result(References {
            client,
            professional,
            service,
        })?)
    }

    /// Commit-time re-check against the store, never against a caller snapshot.
    fn ensure_slot_free(
        &self,
        store: &S,
        input: &ValidatedAppointment,
        exclude_appointment_id: Option<i64>,
    ) -> Result<(), SchedulingError> {
        let (professional_id, date, time) = (input.professional_id(), input.date(), input.time());

        let hours = self.calculator.policy().hours_for(professional_id, date);
        if !hours.contains(time) {
            return Err(SchedulingError::validation(
                "time",
                format!("{time} is outside the bookable slots for this day"),
            ));
        }

        let booked =
            self.calculator
                .booked_slots(store, professional_id, date, exclude_appointment_id)?;
        if booked.contains(&time) {
            tracing::warn!(professional_id, %date, %time, "Slot already taken");
            return Err(SchedulingError::SlotConflict {
                professional_id,
                date,
                time,
            });
        }
        Ok(())
    }

    /// Write through to the store; a uniqueness failure is a lost race for the slot.
    fn persist(&self, store: &S, record: &Appointment) -> Result<Appointment, SchedulingError> {
        store.put(record).map_err(|err| match err {
            DatabaseError::UniqueViolation(detail) => {
                tracing::warn!(
                    professional_id = record.professional_id,
                    date = %record.date,
                    time = %record.time,
                    detail = %detail,
                    "Slot taken by a concurrent writer"
                );
                SchedulingError::SlotConflict {
                    professional_id: record.professional_id,
                    date: record.date,
                    time: record.time,
                }
            }
            other => SchedulingError::Storage(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Entity, SqliteStore};
    use crate::models::TimeSlot;
    use crate::scheduling::notify::RecordingNotifier;
    use crate::scheduling::WorkingHours;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 10).unwrap()
    }

    struct Seed {
        client: i64,
        professional: i64,
        service: i64,
    }

    fn seed(store: &SqliteStore) -> Seed {
        let client = store
            .put(&Client {
                id: 0,
                name: "Ana Paula".into(),
                email: "ana@example.com".into(),
                phone: "(11) 98765-4321".into(),
                national_id: "123.456.789-00".into(),
                birth_date: NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
                active: true,
            })
            .unwrap();
        let professional = store
            .put(&Professional {
                id: 0,
                name: "Dr. João Silva".into(),
                email: "joao@example.com".into(),
                phone: "(11) 91234-5678".into(),
                specialty: "Cabeleireiro".into(),
                active: true,
            })
            .unwrap();
        let service = store
            .put(&Service {
                id: 0,
                name: "Corte".into(),
                duration_minutes: 30,
                price: 50.0,
                description: None,
                active: true,
            })
            .unwrap();
        Seed {
            client: client.id,
            professional: professional.id,
            service: service.id,
        }
    }

    fn submission(seed: &Seed, time: &str) -> AppointmentSubmission {
        AppointmentSubmission {
            client_id: Some(seed.client),
            professional_id: Some(seed.professional),
            service_id: Some(seed.service),
            date: Some(day().to_string()),
            time: Some(time.into()),
            notes: None,
        }
    }

    fn lifecycle<'a>(
        store: &'a SqliteStore,
        notifier: &'a RecordingNotifier,
    ) -> AppointmentLifecycle<'a, SqliteStore, WorkingHours> {
        AppointmentLifecycle::new(store, WorkingHours::default(), notifier, 500)
    }

    fn book(
        manager: &AppointmentLifecycle<'_, SqliteStore, WorkingHours>,
        sub: &AppointmentSubmission,
    ) -> Result<Appointment, SchedulingError> {
        let input = manager.validate(sub, today())?;
        manager.create(&input)
    }

    fn free_labels(
        manager: &AppointmentLifecycle<'_, SqliteStore, WorkingHours>,
        store: &SqliteStore,
        professional_id: i64,
    ) -> Vec<String> {
        manager
            .calculator()
            .free_slots(store, professional_id, day())
            .unwrap()
            .iter()
            .map(TimeSlot::to_string)
            .collect()
    }

    #[test]
    fn create_snapshots_names_and_schedules() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let mut sub = submission(&ids, "10:00");
        sub.notes = Some("Primeira visita".into());
        let created = book(&manager, &sub).unwrap();

        assert!(created.id > 0);
        assert_eq!(created.status, AppointmentStatus::Scheduled);
        assert_eq!(created.client_name, "Ana Paula");
        assert_eq!(created.professional_name, "Dr. João Silva");
        assert_eq!(created.service_name, "Corte");
        assert_eq!(created.notes.as_deref(), Some("Primeira visita"));
        assert_eq!(manager.get(created.id).unwrap(), created);
        assert_eq!(notifier.kinds(), vec![(EventKind::Created, created.id)]);
    }

    #[test]
    fn booked_slot_disappears_from_free_list() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        book(&manager, &submission(&ids, "09:00")).unwrap();
        let free = free_labels(&manager, &store, ids.professional);
        assert_eq!(free.len(), 17);
        assert_eq!(free.first().unwrap(), "09:30");
        assert_eq!(free.last().unwrap(), "17:30");
    }

    #[test]
    fn second_booking_of_same_slot_conflicts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let first = book(&manager, &submission(&ids, "11:00")).unwrap();
        let err = book(&manager, &submission(&ids, "11:00")).unwrap_err();
        assert!(matches!(err, SchedulingError::SlotConflict { .. }), "got {err}");

        assert_eq!(manager.get(first.id).unwrap().status, AppointmentStatus::Scheduled);
        assert_eq!(manager.list(&AppointmentFilter::default()).unwrap().len(), 1);
        assert_eq!(notifier.events().len(), 1);
    }

    #[test]
    fn conflict_detected_across_connections() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("salon.db");
        let tab_a = SqliteStore::open(&path).unwrap();
        let tab_b = SqliteStore::open(&path).unwrap();
        let ids = seed(&tab_a);
        let notifier = RecordingNotifier::default();

        // Both tabs saw 14:00 as free before either submitted
        let a = lifecycle(&tab_a, &notifier);
        let b = lifecycle(&tab_b, &notifier);
        assert!(free_labels(&b, &tab_b, ids.professional).contains(&"14:00".to_string()));

        book(&a, &submission(&ids, "14:00")).unwrap();
        let err = book(&b, &submission(&ids, "14:00")).unwrap_err();
        assert!(matches!(err, SchedulingError::SlotConflict { .. }));
    }

    /// Store whose appointment listing is always empty, as a stale read would be.
    struct StaleReads<'a>(&'a SqliteStore);

    impl EntityStore for StaleReads<'_> {
        fn list<E: Entity>(&self) -> Result<Vec<E>, DatabaseError> {
            if E::TABLE == Appointment::TABLE {
                return Ok(Vec::new());
            }
            self.0.list()
        }

        fn get<E: Entity>(&self, id: i64) -> Result<Option<E>, DatabaseError> {
            self.0.get(id)
        }

        fn put<E: Entity>(&self, record: &E) -> Result<E, DatabaseError> {
            self.0.put(record)
        }

        fn remove_where<E, F>(&self, predicate: F) -> Result<usize, DatabaseError>
        where
            E: Entity,
            F: Fn(&E) -> bool,
        {
            self.0.remove_where(predicate)
        }
    }

    #[test]
    fn uniqueness_index_backs_up_the_recheck() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        book(&lifecycle(&store, &notifier), &submission(&ids, "15:00")).unwrap();

        let stale = StaleReads(&store);
        let manager = AppointmentLifecycle::new(&stale, WorkingHours::default(), &notifier, 500);
        let input = manager.validate(&submission(&ids, "15:00"), today()).unwrap();
        let err = manager.create(&input).unwrap_err();
        assert!(matches!(err, SchedulingError::SlotConflict { .. }), "got {err}");
    }

    #[test]
    fn unknown_references_are_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let mut sub = submission(&ids, "10:00");
        sub.service_id = Some(999);
        match book(&manager, &sub).unwrap_err() {
            SchedulingError::NotFound { entity, id } => {
                assert_eq!(entity, "Service");
                assert_eq!(id, 999);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(notifier.events().is_empty());
    }

    #[test]
    fn inactive_professional_is_validation_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let mut pro: Professional = store.require(ids.professional).unwrap();
        pro.active = false;
        store.put(&pro).unwrap();

        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);
        match book(&manager, &submission(&ids, "10:00")).unwrap_err() {
            SchedulingError::Validation(errors) => {
                assert!(errors.get("professional_id").is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn create_checks_hours_even_without_validator() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();

        // Validated against a wider window than the manager enforces
        let wide = WorkingHours::new("07:00".parse().unwrap(), "20:00".parse().unwrap(), 30).unwrap();
        let input = validate_appointment(&submission(&ids, "07:30"), &wide, today(), 500).unwrap();

        let manager = lifecycle(&store, &notifier);
        match manager.create(&input).unwrap_err() {
            SchedulingError::Validation(errors) => assert!(errors.get("time").is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn update_keeping_same_slot_does_not_self_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let created = book(&manager, &submission(&ids, "10:00")).unwrap();
        let mut sub = submission(&ids, "10:00");
        sub.notes = Some("Trazer referência".into());
        let input = manager.validate(&sub, today()).unwrap();
        let updated = manager.update(created.id, &input).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.notes.as_deref(), Some("Trazer referência"));
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn update_moves_slot_and_releases_old_one() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let created = book(&manager, &submission(&ids, "10:00")).unwrap();
        let input = manager.validate(&submission(&ids, "16:30"), today()).unwrap();
        manager.update(created.id, &input).unwrap();

        let free = free_labels(&manager, &store, ids.professional);
        assert!(free.contains(&"10:00".to_string()));
        assert!(!free.contains(&"16:30".to_string()));
    }

    #[test]
    fn update_into_taken_slot_conflicts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        book(&manager, &submission(&ids, "10:00")).unwrap();
        let second = book(&manager, &submission(&ids, "10:30")).unwrap();
        let input = manager.validate(&submission(&ids, "10:00"), today()).unwrap();
        assert!(matches!(
            manager.update(second.id, &input),
            Err(SchedulingError::SlotConflict { .. })
        ));
    }

    #[test]
    fn update_unknown_or_terminal_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);
        let input = manager.validate(&submission(&ids, "12:00"), today()).unwrap();

        assert!(matches!(
            manager.update(404, &input),
            Err(SchedulingError::NotFound { id: 404, .. })
        ));

        let created = book(&manager, &submission(&ids, "12:00")).unwrap();
        manager.complete(created.id).unwrap();
        assert!(matches!(
            manager.update(created.id, &input),
            Err(SchedulingError::InvalidTransition { action: "update", .. })
        ));
    }

    #[test]
    fn cancel_frees_slot_and_notifies() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let created = book(&manager, &submission(&ids, "13:00")).unwrap();
        let cancelled = manager.cancel(created.id).unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert!(free_labels(&manager, &store, ids.professional).contains(&"13:00".to_string()));
        assert_eq!(
            notifier.kinds(),
            vec![
                (EventKind::Created, created.id),
                (EventKind::Cancelled, created.id)
            ]
        );

        // Slot can be booked again
        assert!(book(&manager, &submission(&ids, "13:00")).is_ok());
    }

    #[test]
    fn terminal_states_reject_transitions() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let a = book(&manager, &submission(&ids, "09:00")).unwrap();
        let b = book(&manager, &submission(&ids, "09:30")).unwrap();
        manager.cancel(a.id).unwrap();
        manager.complete(b.id).unwrap();

        for id in [a.id, b.id] {
            assert!(matches!(
                manager.cancel(id),
                Err(SchedulingError::InvalidTransition { .. })
            ));
            assert!(matches!(
                manager.complete(id),
                Err(SchedulingError::InvalidTransition { .. })
            ));
        }
        // Only the first cancel produced an event
        let cancels = notifier
            .kinds()
            .into_iter()
            .filter(|(kind, _)| *kind == EventKind::Cancelled)
            .count();
        assert_eq!(cancels, 1);
    }

    #[test]
    fn complete_keeps_slot_booked() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let created = book(&manager, &submission(&ids, "17:30")).unwrap();
        assert_eq!(
            manager.complete(created.id).unwrap().status,
            AppointmentStatus::Completed
        );
        assert!(!free_labels(&manager, &store, ids.professional).contains(&"17:30".to_string()));
    }

    #[test]
    fn cancel_unknown_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);
        assert!(matches!(
            manager.cancel(5),
            Err(SchedulingError::NotFound { .. })
        ));
        assert!(notifier.events().is_empty());
    }

    #[test]
    fn delete_cancelled_appointment_removes_it_everywhere() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let created = book(&manager, &submission(&ids, "10:00")).unwrap();
        manager.cancel(created.id).unwrap();
        manager.delete(created.id).unwrap();

        assert!(free_labels(&manager, &store, ids.professional).contains(&"10:00".to_string()));
        assert!(manager.list(&AppointmentFilter::default()).unwrap().is_empty());
        assert!(matches!(
            manager.get(created.id),
            Err(SchedulingError::NotFound { .. })
        ));
        // Create and cancel only
        assert_eq!(notifier.events().len(), 2);
    }

    #[test]
    fn delete_works_from_any_state_but_not_twice() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let scheduled = book(&manager, &submission(&ids, "09:00")).unwrap();
        manager.delete(scheduled.id).unwrap();
        assert!(free_labels(&manager, &store, ids.professional).contains(&"09:00".to_string()));
        assert!(matches!(
            manager.delete(scheduled.id),
            Err(SchedulingError::NotFound { .. })
        ));
    }

    #[test]
    fn list_applies_filter_and_rejects_inverted_period() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        book(&manager, &submission(&ids, "11:00")).unwrap();
        let early = book(&manager, &submission(&ids, "09:00")).unwrap();
        manager.cancel(early.id).unwrap();

        let all = manager.list(&AppointmentFilter::default()).unwrap();
        let times: Vec<String> = all.iter().map(|a| a.time.to_string()).collect();
        assert_eq!(times, vec!["09:00", "11:00"]);

        let scheduled = manager
            .list(&AppointmentFilter {
                status: Some(AppointmentStatus::Scheduled),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(scheduled.len(), 1);

        let inverted = AppointmentFilter {
            start_date: Some(day()),
            end_date: Some(today()),
            ..Default::default()
        };
        assert!(matches!(
            manager.list(&inverted),
            Err(SchedulingError::Validation(_))
        ));
    }

    #[test]
    fn created_record_matches_stored_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let created = book(&manager, &submission(&ids, "15:30")).unwrap();
        assert_eq!(created.created_at.and_utc().timestamp_subsec_nanos(), 0);

        let stored = manager.get(created.id).unwrap();
        assert_eq!(stored, created);
        let listed = manager.list(&AppointmentFilter::default()).unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn get_editable_rejects_terminal_appointments() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids = seed(&store);
        let notifier = RecordingNotifier::default();
        let manager = lifecycle(&store, &notifier);

        let open = book(&manager, &submission(&ids, "09:00")).unwrap();
        assert_eq!(manager.get_editable(open.id).unwrap(), open);

        let done = book(&manager, &submission(&ids, "10:00")).unwrap();
        manager.complete(done.id).unwrap();
        let dropped = book(&manager, &submission(&ids, "11:00")).unwrap();
        manager.cancel(dropped.id).unwrap();

        for (id, from) in [
            (done.id, AppointmentStatus::Completed),
            (dropped.id, AppointmentStatus::Cancelled),
        ] {
            match manager.get_editable(id).unwrap_err() {
                SchedulingError::InvalidTransition {
                    id: err_id,
                    from: err_from,
                    action,
                } => {
                    assert_eq!(err_id, id);
                    assert_eq!(err_from, from);
                    assert_eq!(action, "update");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(matches!(
            manager.get_editable(999),
            Err(SchedulingError::NotFound { id: 999, .. })
        ));
    }
}
