// ============================================================================
// SCHEDULING SERVICE
// ============================================================================
//
// Description:
//   Garde le status des créneaux synchronisé avec l'existence des
//   rendez-vous: réserver, annuler, déplacer, supprimer un créneau.
//
// Règles:
//   - status = 'booked' <=> exactement un rendez-vous référence le créneau
//   - Réserver = UPDATE conditionnel (status = 'available') dans une
//     transaction avec l'insertion du rendez-vous
//   - Les emails partent APRÈS le commit; un échec d'envoi est loggé,
//     jamais remonté (la réservation reste valide)
//   - La lecture des créneaux répare les créneaux 'booked' orphelins
//
// ============================================================================

use std::collections::HashSet;

use chrono::{DateTime, Local, TimeZone, Utc};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::*;
use uuid::Uuid;

use crate::config::ClinicConfig;
use crate::errors::AppError;
use crate::models::appointments::{
    self, ApprovalStatus, AppointmentStatus, Column as AppointmentColumn, CreatedBy,
    Entity as Appointments,
};
use crate::models::dto::{
    BookingRequest, GenerationReport, StatusUpdateRequest, TimeSlotInput, TimeSlotUpdate,
};
use crate::models::patients::Entity as Patients;
use crate::models::time_slots::{self, Column as SlotColumn, Entity as Slots, SlotStatus};
use crate::services::email_templates::{self, AppointmentDetails, CancelledBy};
use crate::services::notifier::{EmailMessage, Notifier};
use crate::services::slot_generation::{generate_start_times, RecurrenceRule};
use crate::utils::datetime::format_hu_local;

pub struct SchedulingService<'a> {
    db: &'a DatabaseConnection,
    notifier: &'a dyn Notifier,
    clinic: &'a ClinicConfig,
}

impl<'a> SchedulingService<'a> {
    pub fn new(db: &'a DatabaseConnection, notifier: &'a dyn Notifier, clinic: &'a ClinicConfig) -> Self {
        Self { db, notifier, clinic }
    }

    // ------------------------------------------------------------------------
    // Rendez-vous
    // ------------------------------------------------------------------------

    /// Réserve un créneau pour un patient.
    /// Dentiste = approuvé d'office, patient = en attente.
    pub async fn book(
        &self,
        request: BookingRequest,
        created_by: CreatedBy,
    ) -> Result<appointments::Model, AppError> {
        let txn = self.db.begin().await?;

        let patient = Patients::find_by_id(request.patient_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound("Patient"))?;

        let slot = claim_slot(&txn, request.time_slot_id).await?;
        let now = Utc::now();

        let appointment = appointments::ActiveModel {
            id: Set(Uuid::new_v4()),
            patient_id: Set(patient.id),
            time_slot_id: Set(slot.id),
            start_time: Set(slot.start_time),
            patient_name: Set(patient.name.clone()),
            patient_taj: Set(patient.taj.clone()),
            dentist_email: Set(slot.dentist_email.clone()),
            dentist_name: Set(slot.dentist_name.clone()),
            location: Set(slot.location.clone()),
            room: Set(slot.room.clone()),
            appointment_status: Set(None),
            appointment_type: Set(request.appointment_type),
            approval_status: Set(created_by.initial_approval()),
            completion_notes: Set(None),
            is_late: Set(false),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let appointment = appointment.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            appointment_id = %appointment.id,
            time_slot_id = %slot.id,
            created_by = ?created_by,
            "appointment booked"
        );

        if let Some(to) = patient.contact_email() {
            let date = format_hu_local(&appointment.start_time);
            let name = patient.display_name();
            let details = AppointmentDetails {
                patient_name: &name,
                date: &date,
                dentist_name: appointment.dentist_name.as_deref(),
                address: appointment.location.as_deref(),
                room: appointment.room.as_deref(),
            };
            self.deliver(email_templates::appointment_confirmation(self.clinic, to, &details))
                .await;
        }

        Ok(appointment)
    }

    /// Annule (supprime) un rendez-vous et libère son créneau
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        cancelled_by: CancelledBy,
    ) -> Result<appointments::Model, AppError> {
        let txn = self.db.begin().await?;

        let appointment = Appointments::find_by_id(appointment_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound("Appointment"))?;

        let deleted = Appointments::delete_by_id(appointment.id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            return Err(AppError::NotFound("Appointment"));
        }

        release_slot(&txn, appointment.time_slot_id).await?;

        let patient = Patients::find_by_id(appointment.patient_id).one(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            appointment_id = %appointment.id,
            time_slot_id = %appointment.time_slot_id,
            cancelled_by = ?cancelled_by,
            "appointment cancelled"
        );

        if let Some(patient) = patient {
            if let Some(to) = patient.contact_email() {
                let message = email_templates::appointment_cancellation(
                    self.clinic,
                    to,
                    &patient.display_name(),
                    &format_hu_local(&appointment.start_time),
                    cancelled_by,
                );
                self.deliver(message).await;
            }
        }

        Ok(appointment)
    }

    /// Déplace un rendez-vous vers un autre créneau libre
    pub async fn modify(
        &self,
        appointment_id: Uuid,
        new_slot_id: Uuid,
    ) -> Result<appointments::Model, AppError> {
        let txn = self.db.begin().await?;

        let appointment = Appointments::find_by_id(appointment_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound("Appointment"))?;

        if appointment.time_slot_id == new_slot_id {
            return Err(AppError::Validation(
                "The new time slot must differ from the current one".to_string(),
            ));
        }

        let new_slot = claim_slot(&txn, new_slot_id).await?;
        release_slot(&txn, appointment.time_slot_id).await?;

        let old_start_time = appointment.start_time;
        let old_slot_id = appointment.time_slot_id;
        let patient_id = appointment.patient_id;

        let mut active: appointments::ActiveModel = appointment.into();
        active.time_slot_id = Set(new_slot.id);
        active.start_time = Set(new_slot.start_time);
        active.location = Set(new_slot.location.clone());
        active.room = Set(new_slot.room.clone());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        let patient = Patients::find_by_id(patient_id).one(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            appointment_id = %updated.id,
            from_slot = %old_slot_id,
            to_slot = %new_slot.id,
            "appointment moved"
        );

        if let Some(patient) = patient {
            if let Some(to) = patient.contact_email() {
                let old_date = format_hu_local(&old_start_time);
                let new_date = format_hu_local(&updated.start_time);
                let name = patient.display_name();
                let details = AppointmentDetails {
                    patient_name: &name,
                    date: &new_date,
                    dentist_name: updated.dentist_name.as_deref(),
                    address: updated.location.as_deref(),
                    room: updated.room.as_deref(),
                };
                let message =
                    email_templates::appointment_modification(self.clinic, to, &old_date, &details);
                self.deliver(message).await;
            }
        }

        Ok(updated)
    }

    /// Statut du rendez-vous (terminé, absent, ...). Aucun effet sur le créneau.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        update: StatusUpdateRequest,
    ) -> Result<appointments::Model, AppError> {
        let completed = update.appointment_status == Some(AppointmentStatus::Completed);
        let notes = update
            .completion_notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string);

        if completed && notes.is_none() {
            return Err(AppError::Validation(
                "completionNotes is required when the appointment is completed".to_string(),
            ));
        }

        let appointment = self.require_appointment(appointment_id).await?;

        let mut active: appointments::ActiveModel = appointment.into();
        active.appointment_status = Set(update.appointment_status);
        active.completion_notes = Set(if completed { notes } else { None });
        if let Some(is_late) = update.is_late {
            active.is_late = Set(is_late);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(self.db).await?;
        tracing::info!(appointment_id = %updated.id, status = ?updated.appointment_status, "appointment status updated");

        Ok(updated)
    }

    pub async fn update_approval(
        &self,
        appointment_id: Uuid,
        approval_status: ApprovalStatus,
    ) -> Result<appointments::Model, AppError> {
        let appointment = self.require_appointment(appointment_id).await?;

        let mut active: appointments::ActiveModel = appointment.into();
        active.approval_status = Set(approval_status);
        active.updated_at = Set(Utc::now());

        let updated = active.update(self.db).await?;
        tracing::info!(appointment_id = %updated.id, approval = ?approval_status, "appointment approval updated");

        Ok(updated)
    }

    pub async fn find_appointment(&self, id: Uuid) -> Result<Option<appointments::Model>, AppError> {
        Ok(Appointments::find_by_id(id).one(self.db).await?)
    }

    /// Les plus récents d'abord
    pub async fn list_appointments(&self) -> Result<Vec<appointments::Model>, AppError> {
        Ok(Appointments::find()
            .order_by_desc(AppointmentColumn::StartTime)
            .all(self.db)
            .await?)
    }

    pub async fn appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<appointments::Model>, AppError> {
        Ok(Appointments::find()
            .filter(AppointmentColumn::StartTime.gte(start))
            .filter(AppointmentColumn::StartTime.lte(end))
            .order_by_asc(AppointmentColumn::StartTime)
            .all(self.db)
            .await?)
    }

    pub async fn appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<appointments::Model>, AppError> {
        Ok(Appointments::find()
            .filter(AppointmentColumn::PatientId.eq(patient_id))
            .order_by_desc(AppointmentColumn::StartTime)
            .all(self.db)
            .await?)
    }

    pub async fn appointment_for_slot(
        &self,
        time_slot_id: Uuid,
    ) -> Result<Option<appointments::Model>, AppError> {
        Ok(Appointments::find()
            .filter(AppointmentColumn::TimeSlotId.eq(time_slot_id))
            .one(self.db)
            .await?)
    }

    async fn require_appointment(&self, id: Uuid) -> Result<appointments::Model, AppError> {
        self.find_appointment(id)
            .await?
            .ok_or(AppError::NotFound("Appointment"))
    }

    // ------------------------------------------------------------------------
    // Créneaux
    // ------------------------------------------------------------------------

    pub async fn list_slots(&self) -> Result<Vec<time_slots::Model>, AppError> {
        self.heal_orphaned_slots().await?;

        Ok(Slots::find()
            .order_by_asc(SlotColumn::StartTime)
            .all(self.db)
            .await?)
    }

    pub async fn list_slots_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<time_slots::Model>, AppError> {
        self.heal_orphaned_slots().await?;

        Ok(Slots::find()
            .filter(SlotColumn::StartTime.gte(start))
            .filter(SlotColumn::StartTime.lte(end))
            .order_by_asc(SlotColumn::StartTime)
            .all(self.db)
            .await?)
    }

    /// Créneaux libres à venir (portail patient)
    pub async fn list_available_slots(&self, now: DateTime<Utc>) -> Result<Vec<time_slots::Model>, AppError> {
        self.heal_orphaned_slots().await?;

        Ok(Slots::find()
            .filter(SlotColumn::Status.eq(SlotStatus::Available))
            .filter(SlotColumn::StartTime.gt(now))
            .order_by_asc(SlotColumn::StartTime)
            .all(self.db)
            .await?)
    }

    pub async fn find_slot(&self, id: Uuid) -> Result<Option<time_slots::Model>, AppError> {
        Ok(Slots::find_by_id(id).one(self.db).await?)
    }

    pub async fn create_slot(&self, input: TimeSlotInput) -> Result<time_slots::Model, AppError> {
        let slot = self.new_slot(
            input.start_time,
            input.location,
            input.room,
            input.dentist_name,
            input.dentist_email,
        );

        let slot = slot.insert(self.db).await?;
        tracing::info!(time_slot_id = %slot.id, start_time = %slot.start_time, "time slot created");

        Ok(slot)
    }

    /// Modifie un créneau. S'il est réservé, le rendez-vous suit
    /// (heure, lieu, salle) dans la même transaction.
    pub async fn update_slot(
        &self,
        id: Uuid,
        update: TimeSlotUpdate,
    ) -> Result<time_slots::Model, AppError> {
        let txn = self.db.begin().await?;

        let slot = Slots::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound("Time slot"))?;

        let mut active: time_slots::ActiveModel = slot.into();
        if let Some(start_time) = update.start_time {
            active.start_time = Set(start_time);
        }
        if let Some(location) = update.location {
            active.location = Set(Some(location));
        }
        if let Some(room) = update.room {
            active.room = Set(Some(room));
        }
        if let Some(dentist_name) = update.dentist_name {
            active.dentist_name = Set(Some(dentist_name));
        }
        if let Some(dentist_email) = update.dentist_email {
            active.dentist_email = Set(Some(dentist_email));
        }
        active.updated_at = Set(Utc::now());
        let slot = active.update(&txn).await?;

        if slot.status == SlotStatus::Booked {
            Appointments::update_many()
                .col_expr(AppointmentColumn::StartTime, Expr::value(slot.start_time))
                .col_expr(AppointmentColumn::Location, Expr::value(slot.location.clone()))
                .col_expr(AppointmentColumn::Room, Expr::value(slot.room.clone()))
                .col_expr(AppointmentColumn::UpdatedAt, Expr::value(Utc::now()))
                .filter(AppointmentColumn::TimeSlotId.eq(slot.id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        tracing::info!(time_slot_id = %slot.id, "time slot updated");

        Ok(slot)
    }

    /// Supprime un créneau libre. Un créneau réservé doit d'abord être annulé.
    pub async fn delete_slot(&self, id: Uuid) -> Result<(), AppError> {
        let slot = self.find_slot(id).await?.ok_or(AppError::NotFound("Time slot"))?;

        if slot.status == SlotStatus::Booked {
            return Err(AppError::SlotUnavailable);
        }

        let result = Slots::delete_many()
            .filter(SlotColumn::Id.eq(id))
            .filter(SlotColumn::Status.eq(SlotStatus::Available))
            .exec(self.db)
            .await?;

        // Réservé entre la lecture et le delete
        if result.rows_affected == 0 {
            return Err(AppError::SlotUnavailable);
        }

        tracing::info!(time_slot_id = %id, "time slot deleted");
        Ok(())
    }

    /// Génère les créneaux récurrents à partir de maintenant (heure locale du cabinet)
    pub async fn generate_weekly_slots(&self, rule: &RecurrenceRule) -> Result<GenerationReport, AppError> {
        self.generate_weekly_slots_at(rule, &Local::now()).await
    }

    pub async fn generate_weekly_slots_at<Tz: TimeZone>(
        &self,
        rule: &RecurrenceRule,
        now: &DateTime<Tz>,
    ) -> Result<GenerationReport, AppError> {
        rule.check()?;

        let start_times = generate_start_times(rule, now);
        let (Some(first), Some(last)) = (start_times.first(), start_times.last()) else {
            return Ok(GenerationReport { created: 0, skipped: 0 });
        };

        let txn = self.db.begin().await?;

        let existing: HashSet<DateTime<Utc>> = Slots::find()
            .filter(SlotColumn::StartTime.gte(*first))
            .filter(SlotColumn::StartTime.lte(*last))
            .all(&txn)
            .await?
            .into_iter()
            .map(|slot| slot.start_time)
            .collect();

        let new_slots: Vec<time_slots::ActiveModel> = start_times
            .iter()
            .filter(|start_time| !existing.contains(*start_time))
            .map(|start_time| {
                self.new_slot(*start_time, rule.location.clone(), rule.room.clone(), None, None)
            })
            .collect();

        let created = new_slots.len();
        if !new_slots.is_empty() {
            Slots::insert_many(new_slots).exec_without_returning(&txn).await?;
        }
        txn.commit().await?;

        let report = GenerationReport {
            created,
            skipped: start_times.len() - created,
        };
        tracing::info!(created = report.created, skipped = report.skipped, "weekly time slots generated");

        Ok(report)
    }

    fn new_slot(
        &self,
        start_time: DateTime<Utc>,
        location: Option<String>,
        room: Option<String>,
        dentist_name: Option<String>,
        dentist_email: Option<String>,
    ) -> time_slots::ActiveModel {
        let now = Utc::now();

        time_slots::ActiveModel {
            id: Set(Uuid::new_v4()),
            start_time: Set(start_time),
            status: Set(SlotStatus::Available),
            location: Set(Some(location.unwrap_or_else(|| self.clinic.address.clone()))),
            room: Set(room.filter(|room| !room.trim().is_empty())),
            dentist_name: Set(Some(dentist_name.unwrap_or_else(|| self.clinic.dentist_name.clone()))),
            dentist_email: Set(Some(
                dentist_email.unwrap_or_else(|| self.clinic.dentist_email.clone()),
            )),
            user_email: Set(Some(self.clinic.dentist_email.clone())),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    /// Remet en 'available' les créneaux 'booked' sans rendez-vous
    async fn heal_orphaned_slots(&self) -> Result<u64, AppError> {
        let orphaned = Slots::find()
            .filter(SlotColumn::Status.eq(SlotStatus::Booked))
            .filter(SlotColumn::Id.not_in_subquery(booked_slot_ids()))
            .all(self.db)
            .await?;

        if orphaned.is_empty() {
            return Ok(0);
        }

        for slot in &orphaned {
            tracing::warn!(time_slot_id = %slot.id, start_time = %slot.start_time, "booked time slot without appointment, releasing it");
        }

        let result = Slots::update_many()
            .col_expr(SlotColumn::Status, Expr::value(SlotStatus::Available))
            .col_expr(SlotColumn::UpdatedAt, Expr::value(Utc::now()))
            .filter(SlotColumn::Id.is_in(orphaned.iter().map(|slot| slot.id)))
            .filter(SlotColumn::Status.eq(SlotStatus::Booked))
            .filter(SlotColumn::Id.not_in_subquery(booked_slot_ids()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn deliver(&self, message: EmailMessage) {
        if let Err(e) = self.notifier.send(&message).await {
            tracing::warn!(to = %message.to, subject = %message.subject, error = %e, "notification not delivered");
        }
    }
}

/// UPDATE conditionnel: passe le créneau en 'booked' seulement s'il est libre
async fn claim_slot<C: ConnectionTrait>(db: &C, slot_id: Uuid) -> Result<time_slots::Model, AppError> {
    let result = Slots::update_many()
        .col_expr(SlotColumn::Status, Expr::value(SlotStatus::Booked))
        .col_expr(SlotColumn::UpdatedAt, Expr::value(Utc::now()))
        .filter(SlotColumn::Id.eq(slot_id))
        .filter(SlotColumn::Status.eq(SlotStatus::Available))
        .exec(db)
        .await?;

    let slot = Slots::find_by_id(slot_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Time slot"))?;

    if result.rows_affected == 0 {
        return Err(AppError::SlotUnavailable);
    }

    Ok(slot)
}

async fn release_slot<C: ConnectionTrait>(db: &C, slot_id: Uuid) -> Result<(), AppError> {
    Slots::update_many()
        .col_expr(SlotColumn::Status, Expr::value(SlotStatus::Available))
        .col_expr(SlotColumn::UpdatedAt, Expr::value(Utc::now()))
        .filter(SlotColumn::Id.eq(slot_id))
        .exec(db)
        .await?;

    Ok(())
}

fn booked_slot_ids() -> sea_orm::sea_query::SelectStatement {
    Query::select()
        .column(AppointmentColumn::TimeSlotId)
        .from(Appointments)
        .to_owned()
}
