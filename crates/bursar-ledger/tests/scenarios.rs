//! End-to-end engine scenarios on an in-memory database: the full
//! template → assignment → discount → payment → report flow, the audit
//! trail, and the tenant/year/role guard rails.

use std::str::FromStr;

use rusqlite::Connection;

use bursar_core::{
    ActorId, AssignmentSource, DiscountCategory, DiscountKind, FeeCategory, FeeStatus, Frequency,
    Money, PaymentMode, Role, StaticCapabilities, StudentId,
};
use bursar_ledger::assignment::{
    add_custom_fee, assign_fees, assign_fees_roster, assignments_for_student, get_assignment,
    student_fees, OptionalComponent,
};
use bursar_ledger::audit::audit_trail;
use bursar_ledger::catalog::{
    create_fee_component, create_fee_structure, list_components, update_fee_component,
    FeeComponentUpdate, NewFeeComponent, NewFeeStructure,
};
use bursar_ledger::discount::{
    add_discount, deactivate_discount, discounts_for_assignment, NewDiscount,
};
use bursar_ledger::error::LedgerError;
use bursar_ledger::payment::{payment_history, record_payment, NewPayment};
use bursar_ledger::registry::{create_academic_year, enroll_student, set_year_status, YearStatus};
use bursar_ledger::report::report;
use bursar_ledger::{init_schema, ActorContext};
use bursar_core::{AcademicYearId, AssignmentId, ClassId, FeeComponentId, FeeStructureId, TenantId};
use rust_decimal_macros::dec;

const CAPS: StaticCapabilities = StaticCapabilities;

fn m(s: &str) -> Money {
    Money::from_str(s).unwrap()
}

struct Fixture {
    conn: Connection,
    tenant: TenantId,
    year: AcademicYearId,
    class: ClassId,
    student: StudentId,
}

impl Fixture {
    fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let tenant = TenantId::new();
        let year = create_academic_year(&conn, tenant, "2025-26", YearStatus::Active).unwrap();
        let class = ClassId::new();
        let student = StudentId::new();
        enroll_student(&conn, tenant, student, year, class).unwrap();
        Self {
            conn,
            tenant,
            year,
            class,
            student,
        }
    }

    fn ctx(&self, role: Role) -> ActorContext {
        ActorContext {
            tenant: self.tenant,
            actor: ActorId::new(),
            role,
        }
    }

    fn component(&mut self, code: &str, allow_discount: bool) -> FeeComponentId {
        let ctx = self.ctx(Role::Admin);
        create_fee_component(
            &mut self.conn,
            &CAPS,
            &ctx,
            NewFeeComponent {
                name: format!("{code} fee"),
                code: code.to_string(),
                category: FeeCategory::Academic,
                allow_discount,
                is_mandatory_default: true,
            },
        )
        .unwrap()
        .id
    }

    fn structure(
        &mut self,
        component: FeeComponentId,
        amount: &str,
        mandatory: bool,
    ) -> FeeStructureId {
        let ctx = self.ctx(Role::Admin);
        create_fee_structure(
            &mut self.conn,
            &CAPS,
            &ctx,
            NewFeeStructure {
                academic_year_id: self.year,
                class_id: self.class,
                fee_component_id: component,
                amount: m(amount),
                frequency: Frequency::OneTime,
                due_date: None,
                is_mandatory: Some(mandatory),
            },
        )
        .unwrap()
        .id
    }

    /// One mandatory template fee assigned to the fixture student.
    fn assigned(&mut self, amount: &str, allow_discount: bool) -> AssignmentId {
        let component = self.component("TUITION", allow_discount);
        self.structure(component, amount, true);
        let ctx = self.ctx(Role::Admin);
        let assignments =
            assign_fees(&mut self.conn, &CAPS, &ctx, self.student, self.year, &[]).unwrap();
        assert_eq!(assignments.len(), 1);
        assignments[0].id
    }

}

fn discount(name: &str, kind: DiscountKind) -> NewDiscount {
    NewDiscount {
        discount_name: name.to_string(),
        category: DiscountCategory::Custom,
        kind,
        reason: None,
    }
}

fn payment(amount: &str) -> NewPayment {
    NewPayment {
        amount_paid: m(amount),
        payment_mode: PaymentMode::Cash,
        transaction_reference: None,
        paid_at: None,
    }
}

// ── Scenario 1: payments against a shrinking balance ─────────────────

#[test]
fn payments_move_status_through_partial_to_paid_and_then_reject() {
    let mut fx = Fixture::new();
    let id = fx.assigned("15000.00", true);
    let ctx = fx.ctx(Role::Accountant);

    record_payment(&mut fx.conn, &CAPS, &ctx, id, payment("5000.00")).unwrap();
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.paid_amount, m("5000.00"));
    assert_eq!(a.status, FeeStatus::Partial);

    record_payment(&mut fx.conn, &CAPS, &ctx, id, payment("10000.00")).unwrap();
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.paid_amount, m("15000.00"));
    assert_eq!(a.status, FeeStatus::Paid);

    let err = record_payment(&mut fx.conn, &CAPS, &ctx, id, payment("0.01")).unwrap_err();
    assert!(matches!(err, LedgerError::PaymentExceedsBalance { .. }));
}

// ── Scenario 2: discount resolution and the original-amount cap ──────

#[test]
fn percentage_discount_resolves_and_cap_rejects_excess() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);

    let teacher = fx.ctx(Role::Teacher);
    let d = add_discount(
        &mut fx.conn,
        &CAPS,
        &teacher,
        id,
        discount("Sibling", DiscountKind::Percentage(dec!(10))),
    )
    .unwrap();
    assert_eq!(d.computed_amount, m("1000.00"));
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.final_amount, m("9000.00"));
    assert_eq!(a.status, FeeStatus::Unpaid);

    let admin = fx.ctx(Role::Admin);
    let err = add_discount(
        &mut fx.conn,
        &CAPS,
        &admin,
        id,
        discount("Bulk", DiscountKind::Fixed(m("9500.00"))),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Rule(bursar_core::FeeRuleError::DiscountExceedsOriginal { .. })
    ));
    // Nothing committed by the failed call.
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.final_amount, m("9000.00"));
    assert_eq!(discounts_for_assignment(&fx.conn, fx.tenant, id).unwrap().len(), 1);
}

#[test]
fn discount_after_payment_cannot_strand_money_already_paid() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);
    let accountant = fx.ctx(Role::Accountant);
    record_payment(&mut fx.conn, &CAPS, &accountant, id, payment("9000.00")).unwrap();

    // 20% would drop the payable amount to 8000.00, below the 9000.00
    // already collected.
    let admin = fx.ctx(Role::Admin);
    let err = add_discount(
        &mut fx.conn,
        &CAPS,
        &admin,
        id,
        discount("Hardship", DiscountKind::Percentage(dec!(20))),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Rule(bursar_core::FeeRuleError::DiscountBelowPaid { .. })
    ));
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.final_amount, m("10000.00"));
    assert_eq!(a.paid_amount, m("9000.00"));
    assert_eq!(a.status, FeeStatus::Partial);

    // A discount landing exactly on the paid amount is fine and settles
    // the assignment.
    add_discount(
        &mut fx.conn,
        &CAPS,
        &admin,
        id,
        discount("Hardship", DiscountKind::Percentage(dec!(10))),
    )
    .unwrap();
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.final_amount, m("9000.00"));
    assert_eq!(a.status, FeeStatus::Paid);
}

// ── Scenario 3: the >20% admin approval gate ─────────────────────────

#[test]
fn large_discount_needs_admin_tier() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);

    let teacher = fx.ctx(Role::Teacher);
    let err = add_discount(
        &mut fx.conn,
        &CAPS,
        &teacher,
        id,
        discount("Merit", DiscountKind::Percentage(dec!(25))),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Rule(bursar_core::FeeRuleError::InsufficientRole { .. })
    ));

    let admin = fx.ctx(Role::Admin);
    add_discount(
        &mut fx.conn,
        &CAPS,
        &admin,
        id,
        discount("Merit", DiscountKind::Percentage(dec!(25))),
    )
    .unwrap();
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.final_amount, m("7500.00"));
}

// ── Scenario 4: deactivation reopens a paid balance ──────────────────

#[test]
fn deactivating_a_discount_reopens_the_balance() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);
    let admin = fx.ctx(Role::Admin);

    let d = add_discount(
        &mut fx.conn,
        &CAPS,
        &admin,
        id,
        discount("Merit", DiscountKind::Percentage(dec!(25))),
    )
    .unwrap();
    record_payment(&mut fx.conn, &CAPS, &admin, id, payment("7500.00")).unwrap();
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.status, FeeStatus::Paid);

    let d = deactivate_discount(&mut fx.conn, &CAPS, &admin, d.id).unwrap();
    assert!(!d.is_active);
    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.final_amount, m("10000.00"));
    assert_eq!(a.paid_amount, m("7500.00"));
    assert_eq!(a.status, FeeStatus::Partial);
    // Original never moved.
    assert_eq!(a.original_amount, m("10000.00"));
}

// ── Scenario 5: allow_discount = false ───────────────────────────────

#[test]
fn component_forbidding_discounts_rejects_all_roles() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", false);

    for role in [Role::Teacher, Role::Admin, Role::SuperAdmin] {
        let ctx = fx.ctx(role);
        let err = add_discount(
            &mut fx.conn,
            &CAPS,
            &ctx,
            id,
            discount("Any", DiscountKind::Percentage(dec!(5))),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::DiscountNotAllowed));
    }
}

// ── Scenario 6: closed-year gate ─────────────────────────────────────

#[test]
fn closed_year_rejects_every_mutation_but_reads_succeed() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);
    let admin = fx.ctx(Role::Admin);
    set_year_status(&fx.conn, fx.tenant, fx.year, YearStatus::Closed).unwrap();

    let err = assign_fees(&mut fx.conn, &CAPS, &admin, fx.student, fx.year, &[]).unwrap_err();
    assert!(matches!(err, LedgerError::AcademicYearClosed));

    let err = add_custom_fee(
        &mut fx.conn,
        &CAPS,
        &admin,
        fx.student,
        fx.year,
        "Lab damage",
        m("300.00"),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::AcademicYearClosed));

    let err = add_discount(
        &mut fx.conn,
        &CAPS,
        &admin,
        id,
        discount("Late", DiscountKind::Percentage(dec!(5))),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::AcademicYearClosed));

    let err = record_payment(&mut fx.conn, &CAPS, &admin, id, payment("100.00")).unwrap_err();
    assert!(matches!(err, LedgerError::AcademicYearClosed));

    // Reads are ungated.
    assert_eq!(report(&fx.conn, fx.tenant, fx.year, None, None).unwrap().len(), 1);
    assert_eq!(
        payment_history(&fx.conn, fx.tenant, fx.student, Some(fx.year)).unwrap().len(),
        0
    );
}

// ── Idempotence and optional components ──────────────────────────────

#[test]
fn assign_fees_is_idempotent_per_structure() {
    let mut fx = Fixture::new();
    let component = fx.component("TUITION", true);
    fx.structure(component, "8000.00", true);
    let admin = fx.ctx(Role::Admin);

    let first = assign_fees(&mut fx.conn, &CAPS, &admin, fx.student, fx.year, &[]).unwrap();
    let second = assign_fees(&mut fx.conn, &CAPS, &admin, fx.student, fx.year, &[]).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].id, second[0].id);
}

#[test]
fn optional_component_with_override_and_unknown_rejection() {
    let mut fx = Fixture::new();
    let tuition = fx.component("TUITION", true);
    fx.structure(tuition, "8000.00", true);
    let bus = fx.component("BUS", true);
    let bus_structure = fx.structure(bus, "2000.00", false);
    let admin = fx.ctx(Role::Admin);

    let assignments = assign_fees(
        &mut fx.conn,
        &CAPS,
        &admin,
        fx.student,
        fx.year,
        &[OptionalComponent {
            class_fee_structure_id: bus_structure,
            custom_amount: Some(m("1500.00")),
        }],
    )
    .unwrap();
    assert_eq!(assignments.len(), 2);
    let bus_row = assignments
        .iter()
        .find(|a| a.class_fee_structure_id == Some(bus_structure))
        .unwrap();
    assert_eq!(bus_row.original_amount, m("1500.00"));

    let err = assign_fees(
        &mut fx.conn,
        &CAPS,
        &admin,
        fx.student,
        fx.year,
        &[OptionalComponent {
            class_fee_structure_id: FeeStructureId::new(),
            custom_amount: None,
        }],
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownStructure(_)));
}

#[test]
fn roster_assignment_isolates_per_student_failures() {
    let mut fx = Fixture::new();
    let component = fx.component("TUITION", true);
    fx.structure(component, "8000.00", true);
    let admin = fx.ctx(Role::Admin);

    let unenrolled = StudentId::new();
    let outcomes = assign_fees_roster(
        &mut fx.conn,
        &CAPS,
        &admin,
        fx.year,
        &[fx.student, unenrolled],
    );
    assert!(outcomes[0].outcome.is_ok());
    assert!(matches!(
        outcomes[1].outcome,
        Err(LedgerError::NotFound { .. })
    ));
    // The enrolled student's assignment committed despite the failure.
    assert_eq!(
        assignments_for_student(&fx.conn, fx.tenant, fx.student, Some(fx.year))
            .unwrap()
            .len(),
        1
    );
}

// ── Custom fees ──────────────────────────────────────────────────────

#[test]
fn custom_fee_requires_positive_amount() {
    let mut fx = Fixture::new();
    let admin = fx.ctx(Role::Admin);
    let a = add_custom_fee(
        &mut fx.conn,
        &CAPS,
        &admin,
        fx.student,
        fx.year,
        "Library card",
        m("250.00"),
        Some("replacement"),
    )
    .unwrap();
    assert_eq!(a.source, AssignmentSource::Custom);
    assert_eq!(a.original_amount, m("250.00"));
    assert!(a.class_fee_structure_id.is_none());

    let err = add_custom_fee(
        &mut fx.conn,
        &CAPS,
        &admin,
        fx.student,
        fx.year,
        "Zero",
        Money::ZERO,
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Rule(bursar_core::FeeRuleError::InvalidAmount(_))
    ));
}

#[test]
fn blank_names_are_rejected_as_name_errors() {
    let mut fx = Fixture::new();
    let admin = fx.ctx(Role::Admin);

    let err = create_fee_component(
        &mut fx.conn,
        &CAPS,
        &admin,
        NewFeeComponent {
            name: "   ".to_string(),
            code: "LAB".to_string(),
            category: FeeCategory::Academic,
            allow_discount: true,
            is_mandatory_default: true,
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Rule(bursar_core::FeeRuleError::InvalidName(_))
    ));

    let err = add_custom_fee(
        &mut fx.conn,
        &CAPS,
        &admin,
        fx.student,
        fx.year,
        "  ",
        m("100.00"),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Rule(bursar_core::FeeRuleError::InvalidName(_))
    ));
}

#[test]
fn student_fee_view_resolves_names() {
    let mut fx = Fixture::new();
    fx.assigned("8000.00", true);
    let admin = fx.ctx(Role::Admin);
    add_custom_fee(
        &mut fx.conn,
        &CAPS,
        &admin,
        fx.student,
        fx.year,
        "Lab damage",
        m("300.00"),
        None,
    )
    .unwrap();

    let fees = student_fees(&fx.conn, fx.tenant, fx.student, Some(fx.year)).unwrap();
    assert_eq!(fees.len(), 2);
    assert!(fees.iter().any(|f| f.fee_name == "TUITION fee"));
    assert!(fees.iter().any(|f| f.fee_name == "Lab damage"));
}

// ── Audit trail ──────────────────────────────────────────────────────

#[test]
fn every_committed_mutation_writes_exactly_one_audit_entry() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);
    let admin = fx.ctx(Role::Admin);

    // Assignment creation wrote one entry for the assignment.
    assert_eq!(audit_trail(&fx.conn, fx.tenant, *id.as_uuid()).unwrap().len(), 1);

    let d = add_discount(
        &mut fx.conn,
        &CAPS,
        &admin,
        id,
        discount("Merit", DiscountKind::Percentage(dec!(10))),
    )
    .unwrap();
    let trail = audit_trail(&fx.conn, fx.tenant, *d.id.as_uuid()).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].before_snapshot.as_ref().unwrap()["final_amount"], "10000.00");
    assert_eq!(trail[0].after_snapshot["final_amount"], "9000.00");

    let p = record_payment(&mut fx.conn, &CAPS, &admin, id, payment("1000.00")).unwrap();
    let trail = audit_trail(&fx.conn, fx.tenant, *p.id.as_uuid()).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].before_snapshot.as_ref().unwrap()["paid_amount"], "0.00");
    assert_eq!(trail[0].after_snapshot["paid_amount"], "1000.00");
}

#[test]
fn failed_mutation_commits_nothing() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);
    let admin = fx.ctx(Role::Admin);

    let err =
        record_payment(&mut fx.conn, &CAPS, &admin, id, payment("10000.01")).unwrap_err();
    assert!(matches!(err, LedgerError::PaymentExceedsBalance { .. }));

    let a = get_assignment(&fx.conn, fx.tenant, id).unwrap();
    assert_eq!(a.paid_amount, Money::ZERO);
    assert_eq!(a.status, FeeStatus::Unpaid);
    assert!(payment_history(&fx.conn, fx.tenant, fx.student, None).unwrap().is_empty());
}

// ── Tenant isolation ─────────────────────────────────────────────────

#[test]
fn cross_tenant_rows_are_invisible() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);

    let other = TenantId::new();
    let err = get_assignment(&fx.conn, other, id).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));

    let intruder = ActorContext {
        tenant: other,
        actor: ActorId::new(),
        role: Role::SuperAdmin,
    };
    let err = record_payment(&mut fx.conn, &CAPS, &intruder, id, payment("1.00")).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

// ── Capability seam ──────────────────────────────────────────────────

#[test]
fn student_role_cannot_mutate() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);
    let student_ctx = fx.ctx(Role::Student);

    let err =
        record_payment(&mut fx.conn, &CAPS, &student_ctx, id, payment("1.00")).unwrap_err();
    assert!(matches!(err, LedgerError::CapabilityDenied { .. }));

    let err = create_fee_component(
        &mut fx.conn,
        &CAPS,
        &student_ctx,
        NewFeeComponent {
            name: "Sports".to_string(),
            code: "SPORT".to_string(),
            category: FeeCategory::Other,
            allow_discount: true,
            is_mandatory_default: false,
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::CapabilityDenied { .. }));

    // The grant table itself: students are read-only on fees.
    use bursar_core::{CapabilityAction, CapabilityCheck};
    assert!(CAPS.has_capability(Role::Student, "fees", CapabilityAction::Read));
    assert!(!CAPS.has_capability(Role::Student, "fees", CapabilityAction::Update));
}

// ── Catalog ──────────────────────────────────────────────────────────

#[test]
fn duplicate_structure_for_triple_is_a_conflict() {
    let mut fx = Fixture::new();
    let component = fx.component("TUITION", true);
    fx.structure(component, "8000.00", true);
    let admin = fx.ctx(Role::Admin);

    let err = create_fee_structure(
        &mut fx.conn,
        &CAPS,
        &admin,
        NewFeeStructure {
            academic_year_id: fx.year,
            class_id: fx.class,
            fee_component_id: component,
            amount: m("9000.00"),
            frequency: Frequency::OneTime,
            due_date: None,
            is_mandatory: Some(true),
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[test]
fn component_deactivation_is_an_update_not_a_delete() {
    let mut fx = Fixture::new();
    let component = fx.component("TUITION", true);
    let admin = fx.ctx(Role::Admin);

    let updated = update_fee_component(
        &mut fx.conn,
        &CAPS,
        &admin,
        component,
        FeeComponentUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!updated.is_active);
    // Still listed when inactive rows are requested.
    assert_eq!(list_components(&fx.conn, fx.tenant, true).unwrap().len(), 1);
    assert_eq!(list_components(&fx.conn, fx.tenant, false).unwrap().len(), 0);
}

// ── Report ───────────────────────────────────────────────────────────

#[test]
fn report_filters_by_class_and_status_and_carries_balance() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);
    let admin = fx.ctx(Role::Admin);
    record_payment(&mut fx.conn, &CAPS, &admin, id, payment("4000.00")).unwrap();

    let rows = report(&fx.conn, fx.tenant, fx.year, Some(fx.class), None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].balance, m("6000.00"));
    assert_eq!(rows[0].status, FeeStatus::Partial);

    let rows = report(
        &fx.conn,
        fx.tenant,
        fx.year,
        None,
        Some(FeeStatus::Paid),
    )
    .unwrap();
    assert!(rows.is_empty());

    let rows = report(&fx.conn, fx.tenant, fx.year, Some(ClassId::new()), None).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn payment_history_is_ordered_most_recent_first() {
    let mut fx = Fixture::new();
    let id = fx.assigned("10000.00", true);
    let admin = fx.ctx(Role::Admin);

    let earlier = chrono::Utc::now() - chrono::Duration::days(3);
    record_payment(
        &mut fx.conn,
        &CAPS,
        &admin,
        id,
        NewPayment {
            amount_paid: m("1000.00"),
            payment_mode: PaymentMode::Upi,
            transaction_reference: Some("UPI-123".to_string()),
            paid_at: Some(earlier),
        },
    )
    .unwrap();
    record_payment(&mut fx.conn, &CAPS, &admin, id, payment("2000.00")).unwrap();

    let history = payment_history(&fx.conn, fx.tenant, fx.student, Some(fx.year)).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount_paid, m("2000.00"));
    assert_eq!(history[1].amount_paid, m("1000.00"));
    assert_eq!(history[1].transaction_reference.as_deref(), Some("UPI-123"));
}
