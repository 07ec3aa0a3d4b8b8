use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use beacon_auth::{
    Action, Authorization, Context, Permission, PermissionSet, ResourceType, is_allowed,
};
use beacon_core::{EndpointId, OrgId, UserId};

const ENDPOINTS: ResourceType = ResourceType::NotificationEndpoints;

/// A caller holding `grants` instance-scoped read grants within one org.
fn setup(grants: usize) -> (Context, Vec<Permission>) {
    let org = OrgId::new();
    let mut permissions = Vec::with_capacity(grants);
    let mut required = Vec::with_capacity(grants);
    for _ in 0..grants {
        let id = EndpointId::new();
        permissions.push(Permission::at_id(Action::Read, ENDPOINTS, org, id).unwrap());
        required.push(Permission::at_id(Action::Read, ENDPOINTS, org, id).unwrap());
    }

    let auth = Authorization::new(org, UserId::new(), PermissionSet::new(permissions));
    (Context::background().with_authorizer(Arc::new(auth)), required)
}

fn bench_is_allowed(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_allowed");

    for grants in [1usize, 16, 256, 4096] {
        let (ctx, required) = setup(grants);
        let last = required[grants - 1];
        group.throughput(Throughput::Elements(1));

        // Worst case: the matching grant is the last one scanned.
        group.bench_with_input(BenchmarkId::new("last_grant_matches", grants), &last, |b, p| {
            b.iter(|| is_allowed(&ctx, black_box(p)).unwrap());
        });

        let miss =
            Permission::at_id(Action::Read, ENDPOINTS, OrgId::new(), EndpointId::new()).unwrap();
        group.bench_with_input(BenchmarkId::new("denied", grants), &miss, |b, p| {
            b.iter(|| is_allowed(&ctx, black_box(p)).unwrap_err());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_is_allowed);
criterion_main!(benches);
