use criterion::{black_box, criterion_group, Criterion};
use log::trace;
use odata_cst::prelude::*;
use odata_cst::{grammar, parse_odata_uri};

const SIMPLE: &str = "http://services.odata.org/V4/TripPinService/People('russellwhyte')";

const QUERY: &str = "http://services.odata.org/V4/TripPinService/People?$filter=FirstName eq 'Scott' and \
     contains(LastName,'Ket')&$orderby=LastName desc,FirstName&$top=10&$skip=20&$count=true";

const EXPAND: &str = "http://host/service/Customers?$expand=Orders($filter=Amount gt 100;\
     $select=Id,Amount;$expand=Items($top=5;$orderby=Price desc))&$select=Name,Address/City";

const FILTER: &str = "$filter=(Price sub 5) mul 2 gt 10 or not endswith(Name,'x') \
     and geo.distance(Location,geography'SRID=4326;Point(-122.1 47.6)') lt 900.5";

pub fn bench_uris(c: &mut Criterion) {
    for (name, uri) in [("uri_simple", SIMPLE), ("uri_query", QUERY), ("uri_expand", EXPAND)] {
        c.bench_function(name, |b| b.iter(|| parse_odata_uri(black_box(uri))));
    }
}

pub fn bench_filter(c: &mut Criterion) {
    c.bench_function("filter", |b| {
        b.iter(|| grammar::filter(Input::new(black_box(FILTER))))
    });
}

criterion_group!(benches, bench_uris, bench_filter);

fn main() {
    env_logger::init();
    trace!(target: "odata", "Logging enabled");
    benches();
    Criterion::default().configure_from_args().final_summary();
}
