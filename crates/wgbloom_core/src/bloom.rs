//! The Bloom filter benchmark: insert, self-query, cross-query.
use crate::bench::Benchmark;
use crate::config::BloomConfig;
use crate::corpus::Corpus;
use crate::device::{Device, DeviceLimits};
use crate::errors::{BloomError, Result};
use crate::filter::DeviceFilter;
use crate::grid::LaunchConfig;
use crate::kernels::{InsertKernel, QueryKernel, QueryResults};
use crate::queue::Queue;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

pub struct BloomBenchmark {
    config: BloomConfig,
    input: Corpus,
    query: Corpus,
    filter: DeviceFilter,
    input_results: QueryResults,
    query_results: QueryResults,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BloomReport {
    pub filter_bits: usize,
    pub filter_bits_set: usize,
    pub filter_digest: String,
    pub inserted_words: usize,
    pub query_words: usize,
    /// Inserted words the self-query reported absent; zero on a correct run.
    pub false_negatives: usize,
    pub num_true: usize,
    pub num_false: usize,
}

impl BloomBenchmark {
    /// Builds the benchmark from explicit corpora instead of generated ones.
    pub fn with_corpora(config: BloomConfig, input: Corpus, query: Corpus) -> Result<Self> {
        config.validate()?;
        input.validate()?;
        query.validate()?;
        let filter = DeviceFilter::new(config.size);
        let input_results = QueryResults::new(input.len());
        let query_results = QueryResults::new(query.len());
        tracing::debug!(
            input_words = input.len(),
            query_words = query.len(),
            size = config.size,
            "bloom setup"
        );
        Ok(Self { config, input, query, filter, input_results, query_results })
    }

    pub fn filter(&self) -> &DeviceFilter { &self.filter }
    pub fn input(&self) -> &Corpus { &self.input }
    pub fn query(&self) -> &Corpus { &self.query }
    pub fn input_results(&self) -> &QueryResults { &self.input_results }
    pub fn query_results(&self) -> &QueryResults { &self.query_results }

    /// Both corpora, and the budgets they were drawn from, must fit in group-local memory.
    fn check_capacity(&self, limits: &DeviceLimits) -> Result<()> {
        let needed = self
            .config
            .true_file_size
            .max(self.config.false_file_size)
            .max(self.input.bytes().len())
            .max(self.query.bytes().len());
        if needed > limits.local_mem_size {
            return Err(BloomError::Capacity {
                what: "corpus",
                needed,
                available: limits.local_mem_size,
            });
        }
        Ok(())
    }

    fn launch(&self, corpus: &Corpus, limits: &DeviceLimits) -> Result<LaunchConfig> {
        self.check_capacity(limits)?;
        LaunchConfig::for_words(corpus.len(), self.config.num_hashes, limits.max_work_group_size)
    }
}

impl Benchmark for BloomBenchmark {
    type Args = BloomConfig;
    type Report = BloomReport;

    fn name() -> &'static str { "BloomFilter" }

    fn setup(config: &BloomConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let input = Corpus::generate(config.true_file_size, &mut rng);
        let query = Corpus::generate(config.false_file_size, &mut rng);
        Self::with_corpora(config.clone(), input, query)
    }

    fn run<D: Device>(&mut self, queue: &mut Queue<'_, D>) -> Result<()> {
        let n = self.config.num_hashes;
        queue.submit("insert", |limits| {
            let launch = self.launch(&self.input, limits)?;
            Ok((launch, InsertKernel::new(&self.input, &self.filter, n)?))
        });
        queue.submit("self-query", |limits| {
            let launch = self.launch(&self.input, limits)?;
            Ok((launch, QueryKernel::new(&self.input, &self.filter, &self.input_results, n)?))
        });
        queue.submit("cross-query", |limits| {
            let launch = self.launch(&self.query, limits)?;
            Ok((launch, QueryKernel::new(&self.query, &self.filter, &self.query_results, n)?))
        });
        Ok(())
    }

    fn verify(&self) -> Result<bool> {
        let (_, misses) = self.input_results.tally();
        let (num_true, num_false) = self.query_results.tally();
        tracing::info!(num_true, num_false, "query tally");
        if misses > 0 {
            tracing::warn!(misses, "inserted words reported absent");
        }
        Ok(misses == 0)
    }

    fn report(&self) -> BloomReport {
        let (num_true, num_false) = self.query_results.tally();
        BloomReport {
            filter_bits: self.filter.len(),
            filter_bits_set: self.filter.count_set(),
            filter_digest: self.filter.digest(),
            inserted_words: self.input.len(),
            query_words: self.query.len(),
            false_negatives: self.input_results.tally().1,
            num_true,
            num_false,
        }
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(path) = &self.config.output {
            self.filter.write_ascii(path)?;
            tracing::info!(path = %path.display(), "filter written");
        }
        Ok(())
    }
}
