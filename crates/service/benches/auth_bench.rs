use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::service::{AuthService, AuthConfig};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::domain::{SignUpInput, SignInInput};

fn bench_sign_in(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo.clone(), AuthConfig::new("bench-secret"));

    // pre-create the account outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.sign_up(SignUpInput { name: "Bench".into(), email: "bench@example.com".into(), password: "Benchmark1".into(), company_name: "Bench Co".into() }));

    c.bench_function("auth_sign_in_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.sign_in(SignInInput { email: "bench@example.com".into(), password: "Benchmark1".into() })).unwrap();
        });
    });
}

criterion_group!(benches, bench_sign_in);
criterion_main!(benches);
