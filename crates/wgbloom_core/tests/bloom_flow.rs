use wgbloom_core::{
    Benchmark, BenchmarkApp, BloomBenchmark, BloomConfig, Corpus, Device, DeviceFilter, DeviceLimits,
    HostDevice, InsertKernel, LaunchConfig, Queue, QueryKernel, QueryResults, RunOptions,
};

fn device() -> HostDevice {
    HostDevice::new(DeviceLimits { threads: Some(4), ..Default::default() }).unwrap()
}

#[test]
fn abc_is_found_after_insertion() {
    let corpus = Corpus::from_bytes(b"abc,".to_vec(), 1).unwrap();
    let filter = DeviceFilter::new(1024);
    let results = QueryResults::new(1);
    let dev = device();
    let launch = LaunchConfig::for_words(1, 4, dev.limits().max_work_group_size).unwrap();
    dev.dispatch(&launch, &InsertKernel::new(&corpus, &filter, 4).unwrap()).unwrap();
    dev.dispatch(&launch, &QueryKernel::new(&corpus, &filter, &results, 4).unwrap()).unwrap();
    assert_eq!(results.snapshot(), vec![1]);
}

#[test]
fn repeated_insertion_leaves_filter_unchanged() {
    let corpus = Corpus::generate(2500, &mut <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(11));
    let filter = DeviceFilter::new(8192);
    let dev = device();
    let launch = LaunchConfig::for_words(corpus.len(), 6, 256).unwrap();
    let kernel = InsertKernel::new(&corpus, &filter, 6).unwrap();
    dev.dispatch(&launch, &kernel).unwrap();
    let once = filter.snapshot();
    dev.dispatch(&launch, &kernel).unwrap();
    assert_eq!(filter.snapshot(), once);
}

#[test]
fn results_only_decrease_across_passes() {
    let inserted = Corpus::from_words(&["red", "green", "blue"]).unwrap();
    let queried = Corpus::from_words(&["red", "cyan", "blue", "magenta"]).unwrap();
    let filter = DeviceFilter::new(2048);
    let dev = device();
    let launch = LaunchConfig::for_words(inserted.len(), 5, 1024).unwrap();
    dev.dispatch(&launch, &InsertKernel::new(&inserted, &filter, 5).unwrap()).unwrap();

    let results = QueryResults::new(queried.len());
    let qlaunch = LaunchConfig::for_words(queried.len(), 5, 1024).unwrap();
    let kernel = QueryKernel::new(&queried, &filter, &results, 5).unwrap();
    dev.dispatch(&qlaunch, &kernel).unwrap();
    let first = results.snapshot();
    dev.dispatch(&qlaunch, &kernel).unwrap();
    let second = results.snapshot();
    assert!(first.iter().zip(&second).all(|(a, b)| b <= a));
    assert_eq!(first[0], 1);
    assert_eq!(first[2], 1);
}

#[test]
fn cross_query_covers_every_query_word() {
    // More query words than inserted words, spread over several groups.
    let inserted = Corpus::from_words(&["abc"]).unwrap();
    let words: Vec<String> = (0..100).map(|i| format!("q{i}")).collect();
    let queried = Corpus::from_words(&words).unwrap();
    let cfg = BloomConfig { size: 100_000, num_hashes: 10, ..Default::default() };
    let mut bench = BloomBenchmark::with_corpora(cfg, inserted, queried).unwrap();
    let dev = HostDevice::new(DeviceLimits { max_work_group_size: 320, ..Default::default() }).unwrap();
    let mut q = Queue::new(&dev);
    bench.run(&mut q).unwrap();
    assert!(q.events().iter().all(|e| e.is_complete()));
    assert!(bench.verify().unwrap());
    let report = bench.report();
    assert_eq!(report.num_true + report.num_false, 100);
    assert_eq!(report.num_false, 100);
}

#[test]
fn seeded_runs_are_reproducible() {
    let cfg = BloomConfig { size: 16_384, seed: Some(2024), num_runs: 2, ..Default::default() };
    let app = BenchmarkApp::new(device(), RunOptions { num_runs: cfg.num_runs, verify: true });
    let summary = app.run::<BloomBenchmark>(&cfg).unwrap();
    assert_eq!(summary.runs.len(), 2);
    assert!(summary.verified());
    assert_eq!(summary.runs[0].report, summary.runs[1].report);
    assert!(summary.min_ms <= summary.max_ms);
    assert_eq!(summary.runs[0].events.len(), 3);
}

#[test]
fn degenerate_config_still_reports() {
    let cfg = BloomConfig { num_hashes: 0, seed: Some(5), ..Default::default() };
    let app = BenchmarkApp::new(device(), RunOptions { num_runs: 1, verify: true });
    let summary = app.run::<BloomBenchmark>(&cfg).unwrap();
    let report = summary.last_report().unwrap();
    assert_eq!(report.filter_bits_set, 0);
    assert!(summary.runs[0].events.iter().all(|e| !e.is_complete()));
}

#[test]
fn empty_query_corpus_skips_cross_query_only() {
    let cfg = BloomConfig { false_file_size: 2, seed: Some(5), ..Default::default() };
    let app = BenchmarkApp::new(device(), RunOptions::from(&cfg));
    let summary = app.run::<BloomBenchmark>(&cfg).unwrap();
    let events = &summary.runs[0].events;
    assert!(events[0].is_complete());
    assert!(events[1].is_complete());
    assert!(!events[2].is_complete());
    assert!(summary.verified());
    let report = summary.last_report().unwrap();
    assert_eq!(report.query_words, 0);
    assert_eq!((report.num_true, report.num_false), (0, 0));
}

#[test]
fn filter_dump_is_written_after_run() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bloom.txt");
    let cfg = BloomConfig { size: 512, num_hashes: 3, seed: Some(8), output: Some(out.clone()), ..Default::default() };
    let app = BenchmarkApp::new(device(), RunOptions { num_runs: 1, verify: false });
    let summary = app.run::<BloomBenchmark>(&cfg).unwrap();
    assert_eq!(summary.runs[0].verified, None);
    let dump = std::fs::read(&out).unwrap();
    assert_eq!(dump.len(), 512);
    let ones = dump.iter().filter(|&&b| b == b'1').count();
    assert_eq!(ones, summary.last_report().unwrap().filter_bits_set);
}
